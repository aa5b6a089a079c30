//! Persistence of the last viewed page
//!
//! Best-effort: callers log storage failures and carry on.

mod memory;
mod page_state;
mod sqlite;
mod types;

pub use memory::MemoryStore;
pub use page_state::{restore_initial_page, KeyValuePageStore, KeyValueStore, PageStateStore};
pub use sqlite::SqliteStore;
pub use types::{PageState, StorageError, LAST_VIEWED_PAGE, PDF_FILE_PATH};
