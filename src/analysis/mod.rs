//! Page analysis
//!
//! Capture the rendered page, measure the capture, and run text
//! recognition on it, at most one page at a time and at most once per page
//! unless forced.

mod cache;
mod collaborators;
mod controller;
#[cfg(test)]
pub(crate) mod fakes;

pub use cache::AnalysisCache;
pub use collaborators::{
    CaptureError, DirectoryCapture, ImageFileProber, ImageProber, ProbeError, ViewCapture,
};
pub use controller::{
    AnalysisError, AnalysisJob, AnalysisOutput, AnalysisStage, AnalysisStatus, Collaborators,
    PageAnalysisController, DEFAULT_SETTLE_DELAY,
};

