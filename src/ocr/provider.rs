//! OCR Providers
//!
//! Defines the recognizer trait consumed by page analysis and a Tesseract
//! backend that shells out to the `tesseract` executable.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use super::tsv::parse_tsv;
use super::types::{OcrError, RecognitionResult};

/// Text recognizer: image file in, block/line/word geometry out
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Recognize text in the image at `image_path`
    async fn recognize(&self, image_path: &Path) -> Result<RecognitionResult, OcrError>;
}

/// Tesseract OCR provider
pub struct TesseractRecognizer {
    /// Path to the tesseract executable
    executable: PathBuf,
}

impl TesseractRecognizer {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Check if the executable can be launched
    pub async fn is_available(&self) -> bool {
        Command::new(&self.executable)
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image_path: &Path) -> Result<RecognitionResult, OcrError> {
        let output = Command::new(&self.executable)
            .arg(image_path)
            .arg("stdout")
            .arg("tsv")
            .output()
            .await
            .map_err(|e| {
                OcrError::ProviderNotAvailable(format!(
                    "Failed to run {}: {}",
                    self.executable.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| OcrError::InvalidOutput(format!("Output is not UTF-8: {}", e)))?;

        parse_tsv(&stdout)
    }
}

/// Mock recognizer for testing
#[cfg(test)]
pub struct MockRecognizer {
    pub response: Result<RecognitionResult, String>,
}

#[cfg(test)]
#[async_trait]
impl TextRecognizer for MockRecognizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn recognize(&self, _image_path: &Path) -> Result<RecognitionResult, OcrError> {
        self.response
            .clone()
            .map_err(OcrError::ProcessingError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_executable_is_unavailable() {
        let recognizer = TesseractRecognizer::new("/nonexistent/tesseract-binary");
        assert!(!recognizer.is_available().await);

        let result = recognizer.recognize(Path::new("page.png")).await;
        assert!(matches!(result, Err(OcrError::ProviderNotAvailable(_))));
    }

    #[tokio::test]
    async fn test_mock_recognizer_error_maps_to_processing_error() {
        let recognizer = MockRecognizer {
            response: Err("model crashed".to_string()),
        };
        let err = recognizer.recognize(Path::new("page.png")).await.unwrap_err();
        assert_eq!(err.to_string(), "OCR processing failed: model crashed");
    }
}
