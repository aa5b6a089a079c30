//! Document importer
//!
//! Copies a picked PDF into the app-private `pdfs/` folder so the viewer
//! always opens a stable local path.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::types::{ImportError, ImportedDocument, PDF_DIR};

const PDF_MAGIC: &[u8] = b"%PDF";

pub struct DocumentImporter {
    documents_dir: PathBuf,
}

impl DocumentImporter {
    pub fn new(documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
        }
    }

    /// Folder imported documents are copied into
    pub fn pdf_dir(&self) -> PathBuf {
        self.documents_dir.join(PDF_DIR)
    }

    /// Copy `source` into [`pdf_dir`](Self::pdf_dir).
    ///
    /// A document already imported under the same name with the same content
    /// is reused. A different document with the same name is stored with the
    /// first 8 hex digits of its hash appended to the stem.
    pub async fn import(&self, source: &Path) -> Result<ImportedDocument, ImportError> {
        if !has_pdf_mime(source) {
            return Err(ImportError::NotPdf(source.display().to_string()));
        }
        let file_name = source
            .file_name()
            .ok_or_else(|| ImportError::NotPdf(source.display().to_string()))?;

        let content = tokio::fs::read(source)
            .await
            .map_err(|e| ImportError::copy_failed(source, e))?;
        if !content.starts_with(PDF_MAGIC) {
            return Err(ImportError::NotPdf(format!(
                "{} does not start with a PDF header",
                source.display()
            )));
        }
        let sha256 = compute_hash(&content);

        let pdf_dir = self.pdf_dir();
        tokio::fs::create_dir_all(&pdf_dir)
            .await
            .map_err(|e| ImportError::copy_failed(&pdf_dir, e))?;

        let mut target = pdf_dir.join(file_name);
        if let Some(existing) = existing_hash(&target).await? {
            if existing == sha256 {
                tracing::info!("{} already imported", target.display());
                return Ok(ImportedDocument {
                    path: target,
                    sha256,
                    deduplicated: true,
                });
            }

            target = pdf_dir.join(suffixed_name(source, &sha256));
            if existing_hash(&target).await?.as_deref() == Some(sha256.as_str()) {
                tracing::info!("{} already imported", target.display());
                return Ok(ImportedDocument {
                    path: target,
                    sha256,
                    deduplicated: true,
                });
            }
        }

        // Write beside the target and rename so a partial copy is never visible
        let partial = pdf_dir.join(format!(".{}.part", Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&partial, &content).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(ImportError::copy_failed(&partial, e));
        }
        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(ImportError::copy_failed(&target, e));
        }

        tracing::info!(
            "Imported {} as {} ({} bytes)",
            source.display(),
            target.display(),
            content.len()
        );

        Ok(ImportedDocument {
            path: target,
            sha256,
            deduplicated: false,
        })
    }
}

fn has_pdf_mime(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .is_some_and(|mime| mime.essence_str() == "application/pdf")
}

/// Hash of the file at `path`, or `None` if there is no such file
async fn existing_hash(path: &Path) -> Result<Option<String>, ImportError> {
    match tokio::fs::read(path).await {
        Ok(content) => Ok(Some(compute_hash(&content))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ImportError::copy_failed(path, e)),
    }
}

fn suffixed_name(source: &Path, sha256: &str) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("{}-{}.pdf", stem, &sha256[..8])
}

/// Compute SHA-256 hash of data
pub fn compute_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
