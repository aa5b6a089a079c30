//! OCR Lasso
//!
//! Free-hand lasso text selection over OCR'd PDF pages, with the last viewed
//! page remembered per document.
//!
//! # Modules
//!
//! - `geometry`: points, rectangles, lasso path parsing, image-to-view mapping
//! - `ocr`: recognition result hierarchy and text recognizers
//! - `selection`: overlap selection of recognized words
//! - `analysis`: capture → measure → recognize state machine
//! - `session`: single-owner session state and its runtime task
//! - `storage`: last-page persistence
//! - `import`: copying picked PDFs into app storage

pub mod analysis;
pub mod config;
pub mod geometry;
pub mod import;
pub mod ocr;
pub mod selection;
pub mod session;
pub mod storage;
