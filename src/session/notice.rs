//! User-visible notices

use serde::Serialize;

use crate::analysis::{AnalysisError, AnalysisStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Dismissible message for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    /// Analysis stage the notice is about, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<AnalysisStage>,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            stage: None,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            stage: None,
            message: message.into(),
        }
    }

    /// Notice for a recognition that succeeded without finding any text
    pub fn no_text(page: u32) -> Self {
        Self {
            level: NoticeLevel::Info,
            stage: Some(AnalysisStage::Recognizing),
            message: format!("No text found on page {}", page),
        }
    }

    /// Notice naming the stage an analysis failed in
    pub fn analysis_failed(page: u32, error: &AnalysisError) -> Self {
        let stage = error.stage();
        Self {
            level: NoticeLevel::Error,
            stage: Some(stage),
            message: format!("Page {}: {} failed ({})", page, stage, error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
