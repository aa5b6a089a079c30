//! Import types

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Folder under the documents directory that holds imported PDFs
pub const PDF_DIR: &str = "pdfs";

/// A document available to the viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedDocument {
    /// Stable local path to open
    pub path: PathBuf,
    pub sha256: String,
    /// The same content was already imported under this path
    pub deduplicated: bool,
}

/// Import errors
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Not a PDF document: {0}")]
    NotPdf(String),

    #[error("Failed to copy document {path}: {source}")]
    DocumentCopyFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ImportError {
    pub(crate) fn copy_failed(path: &Path, source: std::io::Error) -> Self {
        Self::DocumentCopyFailed {
            path: path.to_path_buf(),
            source,
        }
    }
}
