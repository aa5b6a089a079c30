//! Test doubles for page analysis collaborators

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::collaborators::{CaptureError, ImageProber, ProbeError, ViewCapture};
use crate::geometry::{Rect, Size};
use crate::ocr::{OcrError, RecognitionResult, TextBlock, TextElement, TextLine, TextRecognizer};

/// Capture fake that counts calls and can refuse pages
pub(crate) struct FakeCapture {
    pub calls: AtomicUsize,
    pub detached_pages: Vec<u32>,
}

impl FakeCapture {
    pub(crate) fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            detached_pages: Vec::new(),
        }
    }
}

#[async_trait]
impl ViewCapture for FakeCapture {
    async fn capture(&self, page: u32) -> Result<PathBuf, CaptureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.detached_pages.contains(&page) {
            return Err(CaptureError::NotAttached(page));
        }
        Ok(PathBuf::from(format!("/captures/page-{}.png", page)))
    }
}

/// Prober fake returning a fixed size
pub(crate) struct FixedProber(pub Option<Size>);

#[async_trait]
impl ImageProber for FixedProber {
    async fn probe(&self, image_path: &Path) -> Result<Size, ProbeError> {
        self.0.ok_or_else(|| ProbeError::Unreadable {
            path: image_path.to_path_buf(),
            reason: "no image".to_string(),
        })
    }
}

/// Recognizer that holds every call until the gate is notified
pub(crate) struct GatedRecognizer {
    gate: Arc<Notify>,
    response: RecognitionResult,
    calls: AtomicUsize,
}

impl GatedRecognizer {
    pub(crate) fn new(gate: Arc<Notify>, response: RecognitionResult) -> Self {
        Self {
            gate,
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextRecognizer for GatedRecognizer {
    fn name(&self) -> &str {
        "gated"
    }

    async fn recognize(&self, _image_path: &Path) -> Result<RecognitionResult, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.response.clone())
    }
}

/// Recognizer whose task panics on every call
#[derive(Default)]
pub(crate) struct PanickingRecognizer {
    calls: AtomicUsize,
}

impl PanickingRecognizer {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextRecognizer for PanickingRecognizer {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn recognize(&self, _image_path: &Path) -> Result<RecognitionResult, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("recognizer crashed");
    }
}

pub(crate) fn hello_world() -> RecognitionResult {
    RecognitionResult::new(vec![TextBlock::from_lines(vec![TextLine::new(vec![
        TextElement::new("Hello", Rect::new(0.0, 0.0, 100.0, 20.0)),
        TextElement::new("World", Rect::new(200.0, 0.0, 100.0, 20.0)),
    ])])])
}
