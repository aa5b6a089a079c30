//! In-memory key-value store

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::page_state::KeyValueStore;
use super::types::StorageError;

/// Process-local [`KeyValueStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.lock().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_items(&self, items: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut stored = self.items.lock();
        for (key, value) in items {
            stored.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}
