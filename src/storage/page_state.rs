//! Page position persistence
//!
//! The viewer remembers one position: the last page of the last document.
//! It is stored under two string keys so any key-value backend can hold it.

use async_trait::async_trait;

use super::types::{PageState, StorageError, LAST_VIEWED_PAGE, PDF_FILE_PATH};

/// String key-value backend
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Write several items at once; either all are stored or none
    async fn set_items(&self, items: &[(&str, &str)]) -> Result<(), StorageError>;
}

/// Load and save the last viewed position
#[async_trait]
pub trait PageStateStore: Send + Sync {
    async fn load_page_state(&self) -> Result<Option<PageState>, StorageError>;

    async fn save_page_state(&self, state: &PageState) -> Result<(), StorageError>;
}

/// [`PageStateStore`] over the `PDF_FILE_PATH` / `LAST_VIEWED_PAGE` keys
pub struct KeyValuePageStore<S> {
    store: S,
}

impl<S: KeyValueStore> KeyValuePageStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: KeyValueStore> PageStateStore for KeyValuePageStore<S> {
    async fn load_page_state(&self) -> Result<Option<PageState>, StorageError> {
        let Some(document_path) = self.store.get_item(PDF_FILE_PATH).await? else {
            return Ok(None);
        };
        let Some(raw_page) = self.store.get_item(LAST_VIEWED_PAGE).await? else {
            return Ok(None);
        };

        let last_page = raw_page
            .trim()
            .parse::<u32>()
            .map_err(|_| StorageError::InvalidValue {
                key: LAST_VIEWED_PAGE.to_string(),
                value: raw_page.clone(),
            })?;

        Ok(Some(PageState {
            document_path,
            last_page,
        }))
    }

    async fn save_page_state(&self, state: &PageState) -> Result<(), StorageError> {
        let last_page = state.last_page.to_string();
        self.store
            .set_items(&[
                (LAST_VIEWED_PAGE, last_page.as_str()),
                (PDF_FILE_PATH, state.document_path.as_str()),
            ])
            .await
    }
}

/// Page to open `document_path` at.
///
/// The stored page only applies when it was saved for exactly this path;
/// otherwise, and on any storage error, the viewer starts at page 1.
pub async fn restore_initial_page(store: &dyn PageStateStore, document_path: &str) -> u32 {
    match store.load_page_state().await {
        Ok(Some(state)) if state.document_path == document_path && state.last_page >= 1 => {
            tracing::info!("Restoring {} at page {}", document_path, state.last_page);
            state.last_page
        }
        Ok(_) => 1,
        Err(e) => {
            tracing::warn!("Failed to load last page state: {}", e);
            1
        }
    }
}
