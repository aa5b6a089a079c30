//! Page analysis controller
//!
//! Drives one capture → measure → recognize cycle at a time:
//!
//! ```text
//! Idle ──request──▶ Capturing ──▶ Measuring ──▶ Recognizing ──▶ Ready ──ack──▶ Idle
//!                        │             │              │
//!                        └─────────────┴──────────────┴──────▶ Failed ──ack──▶ Idle
//! ```
//!
//! The controller only holds state. The work itself is an [`AnalysisJob`]
//! that the owner runs asynchronously and reports back through
//! [`PageAnalysisController::advance`] and [`PageAnalysisController::finish`],
//! so every state change happens on the owning task.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::cache::AnalysisCache;
use super::collaborators::{CaptureError, ImageProber, ProbeError, ViewCapture};
use crate::geometry::Size;
use crate::ocr::{OcrError, RecognitionResult, TextRecognizer};

/// Default wait between requesting analysis and capturing the page view
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Step of an analysis cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStage {
    Capturing,
    Measuring,
    Recognizing,
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Capturing => "page capture",
            Self::Measuring => "image measurement",
            Self::Recognizing => "text recognition",
        };
        f.write_str(name)
    }
}

/// Controller state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AnalysisStatus {
    Idle,
    Capturing { page: u32 },
    Measuring { page: u32 },
    Recognizing { page: u32 },
    Ready { page: u32 },
    Failed { page: u32, reason: String },
}

impl AnalysisStatus {
    fn in_flight(page: u32, stage: AnalysisStage) -> Self {
        match stage {
            AnalysisStage::Capturing => Self::Capturing { page },
            AnalysisStage::Measuring => Self::Measuring { page },
            AnalysisStage::Recognizing => Self::Recognizing { page },
        }
    }

    /// Page of the cycle in flight, if any
    pub fn busy_page(&self) -> Option<u32> {
        match self {
            Self::Capturing { page } | Self::Measuring { page } | Self::Recognizing { page } => {
                Some(*page)
            }
            _ => None,
        }
    }
}

/// Analysis errors, one per stage
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("View not ready: {0}")]
    ViewNotReady(#[from] CaptureError),

    #[error("Image size unavailable: {0}")]
    ImageSizeUnavailable(#[from] ProbeError),

    #[error("Recognition failed: {0}")]
    RecognitionFailed(#[from] OcrError),

    /// The cycle's task died without reporting an outcome
    #[error("Analysis interrupted during {stage}: {reason}")]
    Interrupted { stage: AnalysisStage, reason: String },
}

impl AnalysisError {
    /// Stage that failed
    pub fn stage(&self) -> AnalysisStage {
        match self {
            Self::ViewNotReady(_) => AnalysisStage::Capturing,
            Self::ImageSizeUnavailable(_) => AnalysisStage::Measuring,
            Self::RecognitionFailed(_) => AnalysisStage::Recognizing,
            Self::Interrupted { stage, .. } => *stage,
        }
    }
}

/// Result of a successful cycle
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutput {
    /// Page the cycle was requested for
    pub page: u32,
    /// Captured image
    pub image_path: PathBuf,
    /// Pixel size of the captured image
    pub image_size: Size,
    pub recognition: RecognitionResult,
}

/// External services used by an analysis cycle
#[derive(Clone)]
pub struct Collaborators {
    pub capture: Arc<dyn ViewCapture>,
    pub prober: Arc<dyn ImageProber>,
    pub recognizer: Arc<dyn TextRecognizer>,
}

impl Collaborators {
    pub fn new(
        capture: Arc<dyn ViewCapture>,
        prober: Arc<dyn ImageProber>,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> Self {
        Self {
            capture,
            prober,
            recognizer,
        }
    }
}

/// One admitted capture → measure → recognize cycle
pub struct AnalysisJob {
    page: u32,
    collaborators: Collaborators,
    settle_delay: Duration,
}

impl fmt::Debug for AnalysisJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisJob")
            .field("page", &self.page)
            .field("settle_delay", &self.settle_delay)
            .finish()
    }
}

impl AnalysisJob {
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Run the cycle. `on_stage` is called when measuring and recognizing
    /// begin; capturing is already the controller's state on admission.
    pub async fn run<F>(self, mut on_stage: F) -> Result<AnalysisOutput, AnalysisError>
    where
        F: FnMut(AnalysisStage) + Send,
    {
        let page = self.page;

        // Let the page view finish rendering before it is rasterized
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let image_path = self.collaborators.capture.capture(page).await?;
        tracing::debug!("Captured page {} to {}", page, image_path.display());

        on_stage(AnalysisStage::Measuring);
        let image_size = self.collaborators.prober.probe(&image_path).await?;
        tracing::debug!(
            "Page {} capture is {}x{} px",
            page,
            image_size.width,
            image_size.height
        );

        on_stage(AnalysisStage::Recognizing);
        let recognition = self.collaborators.recognizer.recognize(&image_path).await?;

        Ok(AnalysisOutput {
            page,
            image_path,
            image_size,
            recognition,
        })
    }
}

/// Page analysis state machine with its analyzed-page cache
pub struct PageAnalysisController {
    status: AnalysisStatus,
    cache: AnalysisCache,
    collaborators: Collaborators,
    settle_delay: Duration,
}

impl PageAnalysisController {
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_settle_delay(collaborators, DEFAULT_SETTLE_DELAY)
    }

    pub fn with_settle_delay(collaborators: Collaborators, settle_delay: Duration) -> Self {
        Self {
            status: AnalysisStatus::Idle,
            cache: AnalysisCache::new(),
            collaborators,
            settle_delay,
        }
    }

    pub fn status(&self) -> &AnalysisStatus {
        &self.status
    }

    pub fn is_idle(&self) -> bool {
        self.status == AnalysisStatus::Idle
    }

    pub fn is_analyzed(&self, page: u32) -> bool {
        self.cache.is_analyzed(page)
    }

    /// Forget that `page` was analyzed
    pub fn evict(&mut self, page: u32) {
        if self.cache.evict(page) {
            tracing::debug!("Evicted page {} from analysis cache", page);
        }
    }

    /// Admit an analysis of `page`.
    ///
    /// Returns `None` (and changes nothing) when the page is already analyzed
    /// and `force` is false, or when another cycle is not yet acknowledged.
    /// Rejected requests are dropped, not queued.
    pub fn request(&mut self, page: u32, force: bool) -> Option<AnalysisJob> {
        if !force && self.cache.is_analyzed(page) {
            tracing::debug!("Page {} already analyzed, skipping", page);
            return None;
        }
        if !self.is_idle() {
            tracing::debug!(
                "Analysis of page {} dropped, controller is {:?}",
                page,
                self.status
            );
            return None;
        }

        tracing::debug!("Starting analysis of page {}", page);
        self.status = AnalysisStatus::Capturing { page };
        Some(AnalysisJob {
            page,
            collaborators: self.collaborators.clone(),
            settle_delay: self.settle_delay,
        })
    }

    /// Record that the in-flight cycle for `page` reached `stage`
    pub fn advance(&mut self, page: u32, stage: AnalysisStage) {
        if self.status.busy_page() != Some(page) {
            tracing::warn!(
                "Ignoring {:?} progress for page {} while {:?}",
                stage,
                page,
                self.status
            );
            return;
        }
        tracing::debug!("Page {} analysis: {}", page, stage);
        self.status = AnalysisStatus::in_flight(page, stage);
    }

    /// Record the outcome of the cycle for `page`.
    ///
    /// Success marks the page analyzed and moves to `Ready`; failure moves
    /// to `Failed`. Either way the controller accepts no new request until
    /// [`acknowledge`](Self::acknowledge) returns it to `Idle`.
    pub fn finish(
        &mut self,
        page: u32,
        outcome: &Result<AnalysisOutput, AnalysisError>,
    ) {
        match outcome {
            Ok(output) => {
                self.cache.mark_analyzed(page);
                self.status = AnalysisStatus::Ready { page };
                tracing::info!(
                    "Analyzed page {}: {} blocks, {} words",
                    page,
                    output.recognition.blocks.len(),
                    output.recognition.word_count()
                );
            }
            Err(e) => {
                self.status = AnalysisStatus::Failed {
                    page,
                    reason: e.to_string(),
                };
                tracing::warn!("Analysis of page {} failed during {}: {}", page, e.stage(), e);
            }
        }
    }

    /// Return to `Idle` after a finished cycle
    pub fn acknowledge(&mut self) {
        if matches!(
            self.status,
            AnalysisStatus::Ready { .. } | AnalysisStatus::Failed { .. }
        ) {
            self.status = AnalysisStatus::Idle;
        }
    }
}
