//! Selection session state
//!
//! Owns everything the viewer draws on top of the PDF: lasso mode, the
//! stroke in progress, one lasso per page, the latest recognition result and
//! the selection computed from them. All mutation goes through
//! [`SelectionSession::update`], so a single owner sees every change in
//! order.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use super::events::{SessionEffect, SessionEvent};
use super::notice::Notice;
use crate::analysis::{AnalysisError, AnalysisOutput, AnalysisStatus, PageAnalysisController};
use crate::geometry::{parse_path, PathBuilder, Point, Rect, Size, ViewLayout};
use crate::ocr::RecognitionResult;
use crate::selection::{select_elements, SelectionResult};
use crate::storage::PageState;

/// Recognition result with the page and capture it came from
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecognition {
    pub page: u32,
    /// Pixel size of the capture the word frames refer to
    pub image_size: Size,
    pub recognition: RecognitionResult,
}

/// Selection computed for a page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSelection {
    pub page: u32,
    #[serde(flatten)]
    pub result: SelectionResult,
}

pub struct SelectionSession {
    document_path: String,
    initial_page: u32,
    current_page: u32,
    total_pages: u32,
    lasso_mode: bool,
    view_size: Size,
    stroke: Option<PathBuilder>,
    lassos: BTreeMap<u32, Vec<Point>>,
    recognition: Option<PageRecognition>,
    selection: Option<PageSelection>,
    notices: VecDeque<Notice>,
    analysis: PageAnalysisController,
}

impl SelectionSession {
    /// Session for `document_path`, opened at `initial_page`
    pub fn new(
        document_path: impl Into<String>,
        initial_page: u32,
        analysis: PageAnalysisController,
    ) -> Self {
        let initial_page = initial_page.max(1);
        Self {
            document_path: document_path.into(),
            initial_page,
            current_page: initial_page,
            total_pages: 0,
            lasso_mode: false,
            view_size: Size::default(),
            stroke: None,
            lassos: BTreeMap::new(),
            recognition: None,
            selection: None,
            notices: VecDeque::new(),
            analysis,
        }
    }

    /// Apply one event and return the work it requires
    pub fn update(&mut self, event: SessionEvent) -> Vec<SessionEffect> {
        let mut effects = Vec::new();

        match event {
            SessionEvent::ToggleLassoMode => effects.extend(self.toggle_lasso_mode()),
            SessionEvent::PageChanged { page, total_pages } => {
                effects.extend(self.page_changed(page, total_pages))
            }
            SessionEvent::LayoutChanged { width, height } => {
                self.layout_changed(Size::new(width, height))
            }
            SessionEvent::StrokeStart(point) => self.stroke_start(point),
            SessionEvent::StrokeMove(point) => self.stroke_move(point),
            SessionEvent::StrokeEnd(point) => self.stroke_end(point),
            SessionEvent::ClearCurrentPage => self.clear_current_page(),
            SessionEvent::ClearAll => self.clear_all(),
            SessionEvent::AnalysisProgress { page, stage } => self.analysis.advance(page, stage),
            SessionEvent::AnalysisFinished { page, outcome } => {
                effects.extend(self.analysis_finished(page, outcome))
            }
            SessionEvent::DismissNotice => {
                self.notices.pop_front();
            }
            SessionEvent::RendererError(reason) => {
                tracing::warn!("Renderer error on {}: {}", self.document_path, reason);
                self.notices
                    .push_back(Notice::error(format!("Could not display document: {}", reason)));
            }
        }

        effects
    }

    // ========================================================================
    // Event handlers
    // ========================================================================

    fn toggle_lasso_mode(&mut self) -> Option<SessionEffect> {
        self.lasso_mode = !self.lasso_mode;

        if !self.lasso_mode {
            if self.stroke.take().is_some() {
                tracing::debug!("Discarded unfinished stroke");
            }
            tracing::debug!("Lasso mode off");
            return None;
        }

        let page = self.current_page;
        tracing::debug!("Lasso mode on, re-analyzing page {}", page);

        if self.recognition.as_ref().is_some_and(|r| r.page == page) {
            self.recognition = None;
        }
        if self.selection.as_ref().is_some_and(|s| s.page == page) {
            self.selection = None;
        }
        self.analysis.evict(page);
        self.analysis.request(page, true).map(SessionEffect::Analyze)
    }

    fn page_changed(&mut self, page: u32, total_pages: u32) -> Vec<SessionEffect> {
        if page == 0 {
            tracing::warn!("Ignoring change to page 0");
            return Vec::new();
        }

        if page != self.current_page && self.stroke.take().is_some() {
            tracing::debug!("Discarded unfinished stroke on page {}", self.current_page);
        }
        self.current_page = page;
        self.total_pages = total_pages;

        let mut effects = vec![SessionEffect::PersistPageState(PageState::new(
            self.document_path.clone(),
            page,
        ))];

        if self.lasso_mode {
            effects.extend(self.analysis.request(page, false).map(SessionEffect::Analyze));
        }
        effects
    }

    fn layout_changed(&mut self, view_size: Size) {
        self.view_size = view_size;
        if let Some(page) = self.recognition.as_ref().map(|r| r.page) {
            self.recompute(page);
        }
    }

    fn stroke_start(&mut self, point: Point) {
        if !self.lasso_mode {
            return;
        }
        let mut path = PathBuilder::new();
        path.move_to(point);
        self.stroke = Some(path);
    }

    fn stroke_move(&mut self, point: Point) {
        if let Some(path) = self.stroke.as_mut() {
            path.line_to(point);
        }
    }

    fn stroke_end(&mut self, point: Point) {
        let Some(mut path) = self.stroke.take() else {
            return;
        };
        path.line_to(point);

        let points = parse_path(path.as_str());
        if points.is_empty() {
            return;
        }

        let page = self.current_page;
        tracing::debug!("Lasso with {} points on page {}", points.len(), page);
        self.lassos.insert(page, points);
        self.recompute(page);
    }

    fn clear_current_page(&mut self) {
        self.lassos.remove(&self.current_page);
        self.selection = None;
    }

    fn clear_all(&mut self) {
        self.recognition = None;
        self.selection = None;
        self.lassos.clear();
        self.stroke = None;
        self.analysis.evict(self.current_page);
    }

    fn analysis_finished(
        &mut self,
        page: u32,
        outcome: Result<AnalysisOutput, AnalysisError>,
    ) -> Option<SessionEffect> {
        self.analysis.finish(page, &outcome);

        match outcome {
            Ok(output) => {
                if output.recognition.is_empty() {
                    self.notices.push_back(Notice::no_text(page));
                }
                self.recognition = Some(PageRecognition {
                    page,
                    image_size: output.image_size,
                    recognition: output.recognition,
                });
                self.recompute(page);
            }
            Err(error) => self.notices.push_back(Notice::analysis_failed(page, &error)),
        }

        self.analysis.acknowledge();

        // The page may have changed while busy; its request was dropped then
        if self.lasso_mode && self.current_page != page {
            return self
                .analysis
                .request(self.current_page, false)
                .map(SessionEffect::Analyze);
        }
        None
    }

    /// Re-run selection for `page` against its current lasso
    fn recompute(&mut self, page: u32) {
        let Some(recognized) = self.recognition.as_ref().filter(|r| r.page == page) else {
            return;
        };
        let Some(lasso) = self.lassos.get(&page) else {
            return;
        };
        let Some(mapper) = ViewLayout::new(self.view_size, recognized.image_size).mapper() else {
            tracing::debug!("Layout of page {} not measured yet, selection deferred", page);
            return;
        };

        if let Some(result) = select_elements(lasso, &recognized.recognition, &mapper) {
            tracing::debug!(
                "Selected {} words on page {}",
                result.selected_elements.len(),
                page
            );
            self.selection = Some(PageSelection { page, result });
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn document_path(&self) -> &str {
        &self.document_path
    }

    /// Page the session was opened at
    pub fn initial_page(&self) -> u32 {
        self.initial_page
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Page count reported by the renderer; 0 until the first page change
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_lasso_mode(&self) -> bool {
        self.lasso_mode
    }

    pub fn view_size(&self) -> Size {
        self.view_size
    }

    /// Command text of the stroke being drawn
    pub fn stroke_path(&self) -> Option<&str> {
        self.stroke.as_ref().map(PathBuilder::as_str)
    }

    pub fn lasso(&self, page: u32) -> Option<&[Point]> {
        self.lassos.get(&page).map(Vec::as_slice)
    }

    pub fn lassos(&self) -> &BTreeMap<u32, Vec<Point>> {
        &self.lassos
    }

    pub fn recognition(&self) -> Option<&PageRecognition> {
        self.recognition.as_ref()
    }

    pub fn selection(&self) -> Option<&PageSelection> {
        self.selection.as_ref()
    }

    /// Selected text on the current page
    pub fn selected_text(&self) -> Option<&str> {
        self.selection
            .as_ref()
            .filter(|s| s.page == self.current_page)
            .and_then(|s| s.result.selected_text.as_deref())
    }

    /// View-space frames of the selected words on the current page
    pub fn highlights(&self) -> Vec<Rect> {
        let page = self.current_page;
        let Some(selection) = self.selection.as_ref().filter(|s| s.page == page) else {
            return Vec::new();
        };
        let Some(recognized) = self.recognition.as_ref().filter(|r| r.page == page) else {
            return Vec::new();
        };
        let Some(mapper) = ViewLayout::new(self.view_size, recognized.image_size).mapper() else {
            return Vec::new();
        };

        selection
            .result
            .selected_elements
            .iter()
            .filter_map(|i| recognized.recognition.element(i.block, i.line, i.element))
            .map(|word| mapper.map_rect(&word.frame))
            .collect()
    }

    pub fn analysis_status(&self) -> &AnalysisStatus {
        self.analysis.status()
    }

    pub fn is_analyzed(&self, page: u32) -> bool {
        self.analysis.is_analyzed(page)
    }

    /// Pending notices, oldest first
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }
}
