//! Configuration management for the lasso viewer

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::analysis::DEFAULT_SETTLE_DELAY;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Wait before capturing a page, in milliseconds
    pub settle_delay_ms: u64,
    /// Directory of rendered page images
    pub capture_dir: PathBuf,
    pub tesseract_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// App-private root; imported PDFs land in `<documents_dir>/pdfs/`
    pub documents_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl AnalysisConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            analysis: AnalysisConfig {
                settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
                capture_dir: PathBuf::from("./captures"),
                tesseract_path: PathBuf::from("tesseract"),
            },
            storage: StorageConfig {
                documents_dir: PathBuf::from("./documents"),
            },
            database: DatabaseConfig {
                url: "sqlite:./ocr-lasso.db".to_string(),
            },
        }
    }
}

impl Config {
    /// Read the `LASSO_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let settle_delay_ms = match lookup("LASSO_SETTLE_DELAY_MS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Invalid LASSO_SETTLE_DELAY_MS {:?}, using {}",
                    raw,
                    defaults.analysis.settle_delay_ms
                );
                defaults.analysis.settle_delay_ms
            }),
            None => defaults.analysis.settle_delay_ms,
        };

        Config {
            analysis: AnalysisConfig {
                settle_delay_ms,
                capture_dir: lookup("LASSO_CAPTURE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.analysis.capture_dir),
                tesseract_path: lookup("LASSO_TESSERACT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.analysis.tesseract_path),
            },
            storage: StorageConfig {
                documents_dir: lookup("LASSO_DOCUMENTS_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.documents_dir),
            },
            database: DatabaseConfig {
                url: lookup("LASSO_DATABASE_URL").unwrap_or(defaults.database.url),
            },
        }
    }
}
