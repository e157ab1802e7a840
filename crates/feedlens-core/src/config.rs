//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3004;
pub const DEFAULT_ANALYZER_WORKERS: usize = 4;
pub const DEFAULT_ANALYZER_TIMEOUT_SECS: u64 = 30;

/// Paths to all Feedlens data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Feedback record export (`data/records.json`, or a `.csv` file).
    pub records_file: PathBuf,
    /// Question catalog (`data/catalog.json`).
    pub catalog_file: PathBuf,
    /// Analyzer backend configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates the root if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            records_file: root.join("records.json"),
            catalog_file: root.join("catalog.json"),
            llm_config_file: root.join("llm-config.json"),
            root,
        })
    }
}

/// Top-level Feedlens configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedlensConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data file paths.
    pub data_paths: DataPaths,
    /// Upper bound on concurrent summarizer/theme calls per report.
    pub analyzer_workers: usize,
    /// Per-request timeout for hosted analyzer calls.
    pub analyzer_timeout_secs: u64,
}

impl FeedlensConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        Self::from_vars(data_dir, |key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(data_dir: impl AsRef<Path>, lookup: F) -> std::io::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let mut data_paths = DataPaths::new(data_dir)?;
        if let Some(records) = lookup("FEEDLENS_RECORDS") {
            data_paths.records_file = PathBuf::from(records);
        }
        if let Some(catalog) = lookup("FEEDLENS_CATALOG") {
            data_paths.catalog_file = PathBuf::from(catalog);
        }

        let analyzer_workers = lookup("FEEDLENS_ANALYZER_WORKERS")
            .and_then(|w| w.parse::<usize>().ok())
            .unwrap_or(DEFAULT_ANALYZER_WORKERS)
            .max(1);

        let analyzer_timeout_secs = lookup("FEEDLENS_ANALYZER_TIMEOUT_SECS")
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_ANALYZER_TIMEOUT_SECS);

        tracing::debug!(
            "Config: port={}, workers={}, records={}",
            port,
            analyzer_workers,
            data_paths.records_file.display()
        );

        Ok(Self {
            port,
            data_paths,
            analyzer_workers,
            analyzer_timeout_secs,
        })
    }
}
