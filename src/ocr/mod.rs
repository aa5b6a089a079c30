//! OCR Module
//!
//! Recognition results for captured pages and the recognizer backends that
//! produce them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_lasso::ocr::{TesseractRecognizer, TextRecognizer};
//!
//! let recognizer = TesseractRecognizer::new("tesseract");
//! let result = recognizer.recognize(Path::new("captures/page-3.png")).await?;
//!
//! for (block, line, element, word) in result.elements() {
//!     println!("{block}.{line}.{element}: {}", word.text);
//! }
//! ```

mod provider;
mod tsv;
mod types;

pub use provider::{TesseractRecognizer, TextRecognizer};
pub use tsv::parse_tsv;
pub use types::{OcrError, RawFrame, RecognitionResult, TextBlock, TextElement, TextLine};

pub(crate) use types::join_words;

#[cfg(test)]
pub(crate) use provider::MockRecognizer;
