//! Session events and effects
//!
//! Every input to the session (gestures, renderer callbacks, analysis
//! progress) is a [`SessionEvent`] delivered to
//! [`SelectionSession::update`](super::SelectionSession::update). Work the
//! session cannot do synchronously comes back out as [`SessionEffect`]s.

use crate::analysis::{AnalysisError, AnalysisJob, AnalysisOutput, AnalysisStage};
use crate::geometry::Point;
use crate::storage::PageState;

#[derive(Debug)]
pub enum SessionEvent {
    /// Flip lasso mode
    ToggleLassoMode,

    /// Renderer moved to `page` (1-based) of `total_pages`
    PageChanged { page: u32, total_pages: u32 },

    /// On-screen size of the page view changed
    LayoutChanged { width: f64, height: f64 },

    /// Touch down, in view coordinates
    StrokeStart(Point),
    StrokeMove(Point),
    /// Touch up; finalizes the lasso for the current page
    StrokeEnd(Point),

    ClearCurrentPage,
    ClearAll,

    /// An analysis cycle for `page` reached `stage`
    AnalysisProgress { page: u32, stage: AnalysisStage },

    /// An analysis cycle for `page` completed
    AnalysisFinished {
        page: u32,
        outcome: Result<AnalysisOutput, AnalysisError>,
    },

    /// Dismiss the oldest notice
    DismissNotice,

    /// Renderer reported an error
    RendererError(String),
}

/// Work requested by the session
#[derive(Debug)]
pub enum SessionEffect {
    /// Run an admitted analysis cycle and report back with
    /// [`SessionEvent::AnalysisProgress`] and [`SessionEvent::AnalysisFinished`]
    Analyze(AnalysisJob),

    /// Save the viewing position; failures are only logged
    PersistPageState(PageState),
}
