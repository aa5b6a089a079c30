//! Page capture and image measurement
//!
//! Page analysis rasterizes the rendered page through a [`ViewCapture`] and
//! reads the pixel size of the result through an [`ImageProber`]. Both are
//! traits so the session can run against a real renderer or a test fake.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::geometry::Size;

/// Capture errors
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Page {0} view is not attached")]
    NotAttached(u32),

    #[error("Capture failed: {0}")]
    Failed(String),
}

/// Image measurement errors
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Cannot read image {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

/// Rasterizes the rendered view of a page into an image file
#[async_trait]
pub trait ViewCapture: Send + Sync {
    async fn capture(&self, page: u32) -> Result<PathBuf, CaptureError>;
}

/// Reads the pixel dimensions of an image file
#[async_trait]
pub trait ImageProber: Send + Sync {
    async fn probe(&self, image_path: &Path) -> Result<Size, ProbeError>;
}

/// Serves pre-rendered page images from a directory (`page-<n>.png`)
pub struct DirectoryCapture {
    dir: PathBuf,
}

impl DirectoryCapture {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn page_path(&self, page: u32) -> PathBuf {
        self.dir.join(format!("page-{}.png", page))
    }
}

#[async_trait]
impl ViewCapture for DirectoryCapture {
    async fn capture(&self, page: u32) -> Result<PathBuf, CaptureError> {
        let path = self.page_path(page);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(CaptureError::Failed(format!(
                "{} is not a file",
                path.display()
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CaptureError::NotAttached(page))
            }
            Err(e) => Err(CaptureError::Failed(format!(
                "Cannot stat {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// Reads image headers with the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileProber;

#[async_trait]
impl ImageProber for ImageFileProber {
    async fn probe(&self, image_path: &Path) -> Result<Size, ProbeError> {
        let path = image_path.to_path_buf();
        let unreadable = |reason: String| ProbeError::Unreadable {
            path: image_path.to_path_buf(),
            reason,
        };

        let (width, height) = tokio::task::spawn_blocking(move || image::image_dimensions(&path))
            .await
            .map_err(|e| unreadable(format!("Probe task failed: {}", e)))?
            .map_err(|e| unreadable(e.to_string()))?;

        Ok(Size::new(width as f64, height as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_capture() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page-2.png"), b"png").unwrap();

        let capture = DirectoryCapture::new(dir.path());
        assert_eq!(capture.capture(2).await.unwrap(), dir.path().join("page-2.png"));
        assert!(matches!(
            capture.capture(3).await,
            Err(CaptureError::NotAttached(3))
        ));
    }

    #[tokio::test]
    async fn test_probe_png_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        image::RgbImage::new(64, 48).save(&path).unwrap();

        let size = ImageFileProber.probe(&path).await.unwrap();
        assert_eq!(size, Size::new(64.0, 48.0));
    }

    #[tokio::test]
    async fn test_probe_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(matches!(
            ImageFileProber.probe(&path).await,
            Err(ProbeError::Unreadable { .. })
        ));
        assert!(ImageFileProber.probe(&dir.path().join("missing.png")).await.is_err());
    }
}
