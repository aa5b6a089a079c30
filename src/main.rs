//! OCR Lasso driver
//!
//! Headless run of one lasso selection:
//!
//! ```text
//! ocr-lasso <document.pdf> <page> <lasso-path>
//! ```
//!
//! The page must already be rendered to `<LASSO_CAPTURE_DIR>/page-<n>.png`.
//! The lasso path is `M x y L x y ...` in the coordinates of that image.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_lasso::analysis::{
    AnalysisStatus, Collaborators, DirectoryCapture, ImageFileProber, ImageProber,
    PageAnalysisController,
};
use ocr_lasso::config::Config;
use ocr_lasso::geometry::parse_path;
use ocr_lasso::import::DocumentImporter;
use ocr_lasso::ocr::TesseractRecognizer;
use ocr_lasso::session::{SelectionSession, SessionEvent, SessionRuntime};
use ocr_lasso::storage::{restore_initial_page, KeyValuePageStore, SqliteStore};

const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocr_lasso=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [document, page, lasso] = args.as_slice() else {
        bail!("usage: ocr-lasso <document.pdf> <page> <lasso-path>");
    };
    let page: u32 = page
        .parse()
        .with_context(|| format!("invalid page number {:?}", page))?;
    if page == 0 {
        bail!("pages are numbered from 1");
    }
    let lasso = parse_path(lasso);
    let (Some(first), Some(last)) = (lasso.first().copied(), lasso.last().copied()) else {
        bail!("lasso path has no points");
    };

    tracing::info!("Starting OCR Lasso v{}", env!("CARGO_PKG_VERSION"));

    // Import the document
    let importer = DocumentImporter::new(&config.storage.documents_dir);
    let imported = importer
        .import(&PathBuf::from(document))
        .await
        .context("failed to import document")?;
    let document_path = imported.path.to_string_lossy().into_owned();

    // Restore position
    let store = SqliteStore::connect(&config.database.url)
        .await
        .with_context(|| format!("failed to open {}", config.database.url))?;
    let page_store = Arc::new(KeyValuePageStore::new(store));
    let initial_page = restore_initial_page(page_store.as_ref(), &document_path).await;

    // Collaborators
    let capture = DirectoryCapture::new(&config.analysis.capture_dir);
    let prober = ImageFileProber;
    let view = prober
        .probe(&capture.page_path(page))
        .await
        .context("page image not available")?;

    let recognizer = TesseractRecognizer::new(&config.analysis.tesseract_path);
    if !recognizer.is_available().await {
        tracing::warn!(
            "{} is not runnable, recognition will fail",
            config.analysis.tesseract_path.display()
        );
    }

    let analysis = PageAnalysisController::with_settle_delay(
        Collaborators::new(Arc::new(capture), Arc::new(prober), Arc::new(recognizer)),
        config.analysis.settle_delay(),
    );
    let session = SelectionSession::new(document_path, initial_page, analysis);
    let (mut handle, task) = SessionRuntime::spawn(session, page_store);

    // The page image is shown 1:1, so view and image space coincide
    handle.send(SessionEvent::LayoutChanged {
        width: view.width,
        height: view.height,
    })?;
    // Page count is unknown without a renderer
    handle.send(SessionEvent::PageChanged {
        page,
        total_pages: 0,
    })?;
    handle.send(SessionEvent::ToggleLassoMode)?;

    let analyzed = tokio::time::timeout(
        ANALYSIS_TIMEOUT,
        handle.wait_for(|s| {
            s.analysis == AnalysisStatus::Idle
                && (s.recognized_page == Some(page) || !s.notices.is_empty())
        }),
    )
    .await
    .context("timed out waiting for analysis")??;

    for notice in &analyzed.notices {
        tracing::warn!("{}", notice.message);
    }
    if analyzed.recognized_page != Some(page) {
        bail!("analysis of page {} failed", page);
    }

    handle.send(SessionEvent::StrokeStart(first))?;
    for point in &lasso[1..] {
        handle.send(SessionEvent::StrokeMove(*point))?;
    }
    handle.send(SessionEvent::StrokeEnd(last))?;

    let selected = handle
        .wait_for(|s| s.selection.as_ref().is_some_and(|sel| sel.page == page))
        .await?;

    match selected.selected_text {
        Some(text) => println!("{}", text),
        None => tracing::info!("No words inside the lasso"),
    }

    // Flush the page-state write before exiting
    drop(handle);
    task.await?;

    Ok(())
}
