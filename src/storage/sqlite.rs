//! SQLite key-value store
//!
//! Persists items in a single `kv_store` table.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::page_state::KeyValueStore;
use super::types::StorageError;

const UPSERT_SQL: &str = r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?, ?, ?)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

/// [`KeyValueStore`] backed by SQLite
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `database_url` and
    /// initialize the table
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        // One connection keeps `sqlite::memory:` databases shared
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the key-value table
    pub async fn init(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(UPSERT_SQL)
            .bind(key)
            .bind(value)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_items(&self, items: &[(&str, &str)]) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();

        // Dropping the transaction on error rolls every write back
        let mut tx = self.pool.begin().await?;
        for (key, value) in items {
            sqlx::query(UPSERT_SQL)
                .bind(*key)
                .bind(*value)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{restore_initial_page, KeyValuePageStore, PageState, PageStateStore};

    #[tokio::test]
    async fn test_set_and_get() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

        assert_eq!(store.get_item("LAST_VIEWED_PAGE").await.unwrap(), None);
        store.set_item("LAST_VIEWED_PAGE", "3").await.unwrap();
        store.set_item("LAST_VIEWED_PAGE", "4").await.unwrap();
        assert_eq!(
            store.get_item("LAST_VIEWED_PAGE").await.unwrap().as_deref(),
            Some("4")
        );
    }

    #[tokio::test]
    async fn test_failed_page_state_write_keeps_previous_pair() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        for event in ["INSERT", "UPDATE"] {
            sqlx::query(&format!(
                "CREATE TRIGGER reject_{event} BEFORE {event} ON kv_store \
                 WHEN NEW.value = '/locked.pdf' \
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;"
            ))
            .execute(&store.pool)
            .await
            .unwrap();
        }

        let pages = KeyValuePageStore::new(store);
        pages
            .save_page_state(&PageState::new("/a.pdf", 5))
            .await
            .unwrap();

        // The page is written first; the path write fails and undoes it
        let result = pages
            .save_page_state(&PageState::new("/locked.pdf", 9))
            .await;
        assert!(matches!(result, Err(StorageError::Database(_))));

        assert_eq!(
            pages.load_page_state().await.unwrap(),
            Some(PageState::new("/a.pdf", 5))
        );
    }

    #[tokio::test]
    async fn test_page_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("state.db").display());

        {
            let store = KeyValuePageStore::new(SqliteStore::connect(&url).await.unwrap());
            store
                .save_page_state(&PageState::new("/docs/pdfs/a.pdf", 9))
                .await
                .unwrap();
        }

        let reopened = KeyValuePageStore::new(SqliteStore::connect(&url).await.unwrap());
        assert_eq!(restore_initial_page(&reopened, "/docs/pdfs/a.pdf").await, 9);
    }
}
