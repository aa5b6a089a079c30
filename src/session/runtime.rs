//! Session runtime
//!
//! Runs a [`SelectionSession`] on its own task. Events arrive over an mpsc
//! channel; analysis jobs run on spawned tasks and report back through a
//! second channel, so the session itself is only ever touched here. Each
//! processed event publishes a fresh [`SessionSnapshot`].

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::events::{SessionEffect, SessionEvent};
use super::notice::Notice;
use super::state::{PageSelection, SelectionSession};
use crate::analysis::{AnalysisError, AnalysisJob, AnalysisStage, AnalysisStatus};
use crate::geometry::{Point, Rect};
use crate::storage::{PageState, PageStateStore};

/// Everything the presentation layer renders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub document_path: String,
    pub initial_page: u32,
    pub current_page: u32,
    pub total_pages: u32,
    pub lasso_mode: bool,
    /// Command text of the stroke being drawn
    pub stroke_path: Option<String>,
    pub lassos: BTreeMap<u32, Vec<Point>>,
    pub analysis: AnalysisStatus,
    /// Page the held recognition result belongs to
    pub recognized_page: Option<u32>,
    pub selection: Option<PageSelection>,
    /// Selected text on the current page
    pub selected_text: Option<String>,
    /// View-space frames of the selected words on the current page
    pub highlights: Vec<Rect>,
    pub notices: Vec<Notice>,
}

impl From<&SelectionSession> for SessionSnapshot {
    fn from(session: &SelectionSession) -> Self {
        Self {
            document_path: session.document_path().to_string(),
            initial_page: session.initial_page(),
            current_page: session.current_page(),
            total_pages: session.total_pages(),
            lasso_mode: session.is_lasso_mode(),
            stroke_path: session.stroke_path().map(str::to_string),
            lassos: session.lassos().clone(),
            analysis: session.analysis_status().clone(),
            recognized_page: session.recognition().map(|r| r.page),
            selection: session.selection().cloned(),
            selected_text: session.selected_text().map(str::to_string),
            highlights: session.highlights(),
            notices: session.notices().cloned().collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Session runtime has stopped")]
pub struct SessionClosed;

/// Sends events to a running session and observes its snapshots
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub fn send(&self, event: SessionEvent) -> Result<(), SessionClosed> {
        self.events.send(event).map_err(|_| SessionClosed)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Result<SessionSnapshot, SessionClosed>
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        self.snapshots
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map(|snapshot| snapshot.clone())
            .map_err(|_| SessionClosed)
    }
}

/// Single owner of a [`SelectionSession`]
pub struct SessionRuntime {
    session: SelectionSession,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    reports_tx: mpsc::UnboundedSender<SessionEvent>,
    reports: mpsc::UnboundedReceiver<SessionEvent>,
    snapshots: watch::Sender<SessionSnapshot>,
    persist: mpsc::UnboundedSender<PageState>,
}

impl SessionRuntime {
    /// Start the session task.
    ///
    /// The task stops once every [`SessionHandle`] is dropped, after pending
    /// page-state writes have been flushed. Analysis jobs still running at
    /// that point finish on their own and their results are discarded.
    pub fn spawn(
        session: SelectionSession,
        store: Arc<dyn PageStateStore>,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (reports_tx, reports) = mpsc::unbounded_channel();
        let (snapshots, snapshots_rx) = watch::channel(SessionSnapshot::from(&session));
        let (persist, persist_rx) = mpsc::unbounded_channel();

        let writer = tokio::spawn(write_page_states(store, persist_rx));

        let runtime = Self {
            session,
            events,
            reports_tx,
            reports,
            snapshots,
            persist,
        };

        let task = tokio::spawn(async move {
            runtime.run().await;
            if let Err(e) = writer.await {
                tracing::error!("Page state writer failed: {}", e);
            }
        });

        let handle = SessionHandle {
            events: events_tx,
            snapshots: snapshots_rx,
        };
        (handle, task)
    }

    async fn run(mut self) {
        tracing::info!(
            "Session started for {} at page {}",
            self.session.document_path(),
            self.session.initial_page()
        );

        loop {
            let event = tokio::select! {
                biased;
                Some(report) = self.reports.recv() => report,
                event = self.events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            self.handle(event);
        }

        tracing::info!("Session for {} closed", self.session.document_path());
    }

    fn handle(&mut self, event: SessionEvent) {
        for effect in self.session.update(event) {
            match effect {
                SessionEffect::Analyze(job) => self.spawn_analysis(job),
                SessionEffect::PersistPageState(state) => {
                    if self.persist.send(state).is_err() {
                        tracing::warn!("Page state writer is gone, position not saved");
                    }
                }
            }
        }
        self.snapshots
            .send_replace(SessionSnapshot::from(&self.session));
    }

    fn spawn_analysis(&self, job: AnalysisJob) {
        let reports = self.reports_tx.clone();
        let page = job.page();

        tokio::spawn(async move {
            // Last stage reached, for a cycle whose task panics
            let reached = Arc::new(Mutex::new(AnalysisStage::Capturing));

            let progress = reports.clone();
            let stage_seen = reached.clone();
            let running = tokio::spawn(job.run(move |stage| {
                *stage_seen.lock() = stage;
                let _ = progress.send(SessionEvent::AnalysisProgress { page, stage });
            }));

            let outcome = match running.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let stage = *reached.lock();
                    tracing::error!("Analysis of page {} aborted during {}: {}", page, stage, e);
                    Err(AnalysisError::Interrupted {
                        stage,
                        reason: e.to_string(),
                    })
                }
            };

            if reports
                .send(SessionEvent::AnalysisFinished { page, outcome })
                .is_err()
            {
                tracing::debug!("Session closed before analysis of page {} finished", page);
            }
        });
    }
}

/// Save page states in the order they were produced
async fn write_page_states(
    store: Arc<dyn PageStateStore>,
    mut states: mpsc::UnboundedReceiver<PageState>,
) {
    while let Some(state) = states.recv().await {
        if let Err(e) = store.save_page_state(&state).await {
            tracing::warn!(
                "Failed to save page {} of {}: {}",
                state.last_page,
                state.document_path,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::Notify;
    use tokio::time::timeout;

    use super::*;
    use crate::analysis::fakes::{
        hello_world, FakeCapture, FixedProber, GatedRecognizer, PanickingRecognizer,
    };
    use crate::analysis::{Collaborators, PageAnalysisController};
    use crate::geometry::Size;
    use crate::ocr::{MockRecognizer, TextRecognizer};
    use crate::storage::{KeyValuePageStore, MemoryStore};

    const WAIT: Duration = Duration::from_secs(5);

    fn session(recognizer: Arc<dyn TextRecognizer>) -> SelectionSession {
        let analysis = PageAnalysisController::with_settle_delay(
            Collaborators::new(
                Arc::new(FakeCapture::new()),
                Arc::new(FixedProber(Some(Size::new(300.0, 20.0)))),
                recognizer,
            ),
            Duration::ZERO,
        );
        SelectionSession::new("/docs/pdfs/a.pdf", 1, analysis)
    }

    fn memory_store() -> Arc<KeyValuePageStore<MemoryStore>> {
        Arc::new(KeyValuePageStore::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_lasso_selection_end_to_end() {
        let recognizer = Arc::new(MockRecognizer {
            response: Ok(hello_world()),
        });
        let (mut handle, _task) = SessionRuntime::spawn(session(recognizer), memory_store());

        handle
            .send(SessionEvent::LayoutChanged {
                width: 300.0,
                height: 20.0,
            })
            .unwrap();
        handle.send(SessionEvent::ToggleLassoMode).unwrap();

        timeout(
            WAIT,
            handle.wait_for(|s| s.recognized_page == Some(1) && s.analysis == AnalysisStatus::Idle),
        )
        .await
        .unwrap()
        .unwrap();

        handle.send(SessionEvent::StrokeStart(Point::new(0.0, 0.0))).unwrap();
        handle.send(SessionEvent::StrokeMove(Point::new(300.0, 0.0))).unwrap();
        handle.send(SessionEvent::StrokeEnd(Point::new(300.0, 20.0))).unwrap();

        let snapshot = timeout(WAIT, handle.wait_for(|s| s.selected_text.is_some()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.selected_text.as_deref(), Some("Hello World"));
        assert_eq!(snapshot.highlights.len(), 2);
        assert!(snapshot.notices.is_empty());
    }

    #[tokio::test]
    async fn test_one_analysis_in_flight() {
        let gate = Arc::new(Notify::new());
        let recognizer = Arc::new(GatedRecognizer::new(gate.clone(), hello_world()));
        let (mut handle, _task) =
            SessionRuntime::spawn(session(recognizer.clone()), memory_store());

        handle.send(SessionEvent::ToggleLassoMode).unwrap();
        timeout(
            WAIT,
            handle.wait_for(|s| s.analysis == AnalysisStatus::Recognizing { page: 1 }),
        )
        .await
        .unwrap()
        .unwrap();

        // Off and on again while recognition is held
        handle.send(SessionEvent::ToggleLassoMode).unwrap();
        timeout(WAIT, handle.wait_for(|s| !s.lasso_mode))
            .await
            .unwrap()
            .unwrap();
        handle.send(SessionEvent::ToggleLassoMode).unwrap();
        let snapshot = timeout(WAIT, handle.wait_for(|s| s.lasso_mode))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.analysis, AnalysisStatus::Recognizing { page: 1 });

        gate.notify_one();
        timeout(
            WAIT,
            handle.wait_for(|s| s.recognized_page == Some(1) && s.analysis == AnalysisStatus::Idle),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(recognizer.calls(), 1);
    }

    #[tokio::test]
    async fn test_panicking_recognizer_does_not_wedge_analysis() {
        let recognizer = Arc::new(PanickingRecognizer::default());
        let (mut handle, _task) =
            SessionRuntime::spawn(session(recognizer.clone()), memory_store());

        handle.send(SessionEvent::ToggleLassoMode).unwrap();
        let snapshot = timeout(
            WAIT,
            handle.wait_for(|s| s.analysis == AnalysisStatus::Idle && !s.notices.is_empty()),
        )
        .await
        .unwrap()
        .unwrap();

        let notice = &snapshot.notices[0];
        assert!(notice.is_error());
        assert_eq!(notice.stage, Some(AnalysisStage::Recognizing));
        assert_eq!(snapshot.recognized_page, None);

        // A later request is admitted again
        handle.send(SessionEvent::ToggleLassoMode).unwrap();
        handle.send(SessionEvent::ToggleLassoMode).unwrap();
        timeout(
            WAIT,
            handle.wait_for(|s| s.analysis == AnalysisStatus::Idle && s.notices.len() == 2),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(recognizer.calls(), 2);
    }

    #[tokio::test]
    async fn test_page_changes_are_persisted_in_order() {
        let recognizer = Arc::new(MockRecognizer {
            response: Ok(hello_world()),
        });
        let store = memory_store();
        let (handle, task) = SessionRuntime::spawn(session(recognizer), store.clone());

        for page in [3, 8, 7] {
            handle
                .send(SessionEvent::PageChanged {
                    page,
                    total_pages: 10,
                })
                .unwrap();
        }
        drop(handle);
        timeout(WAIT, task).await.unwrap().unwrap();

        assert_eq!(
            store.load_page_state().await.unwrap(),
            Some(PageState::new("/docs/pdfs/a.pdf", 7))
        );
    }
}
