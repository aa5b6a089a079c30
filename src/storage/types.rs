//! Storage types

use serde::{Deserialize, Serialize};

/// Key holding the last viewed page number
pub const LAST_VIEWED_PAGE: &str = "LAST_VIEWED_PAGE";

/// Key holding the path of the document the page belongs to
pub const PDF_FILE_PATH: &str = "PDF_FILE_PATH";

/// Last viewed position, persisted on every page change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub document_path: String,
    pub last_page: u32,
}

impl PageState {
    pub fn new(document_path: impl Into<String>, last_page: u32) -> Self {
        Self {
            document_path: document_path.into(),
            last_page,
        }
    }
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}
