//! Document import into app-private storage

mod importer;
mod types;

pub use importer::{compute_hash, DocumentImporter};
pub use types::{ImportError, ImportedDocument, PDF_DIR};
