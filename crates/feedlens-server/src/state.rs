//! Shared application state.

use std::sync::Arc;

use feedlens_aggregate::{FeedbackReport, FilterSelection, QuestionCatalog, ReportPipeline};
use feedlens_analyze::types::AnalyzerStatus;
use feedlens_analyze::TextAnalyzer;
use feedlens_core::{FeedlensConfig, Result};
use feedlens_records::{load_records, RecordSet};
use parking_lot::RwLock;
use tracing::{info, warn};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: FeedlensConfig,
    pub catalog: QuestionCatalog,
    pub analyzer: Arc<dyn TextAnalyzer>,
    pub analyzer_status: AnalyzerStatus,
    records: RwLock<Option<Arc<RecordSet>>>,
    source_error: RwLock<Option<String>>,
}

impl AppState {
    pub fn new(
        config: FeedlensConfig,
        catalog: QuestionCatalog,
        analyzer: Arc<dyn TextAnalyzer>,
        analyzer_status: AnalyzerStatus,
    ) -> Self {
        Self {
            config,
            catalog,
            analyzer,
            analyzer_status,
            records: RwLock::new(None),
            source_error: RwLock::new(None),
        }
    }

    /// Current record set, if one has been loaded.
    pub fn records(&self) -> Option<Arc<RecordSet>> {
        self.records.read().clone()
    }

    /// Last record source failure, if the most recent load failed.
    pub fn source_error(&self) -> Option<String> {
        self.source_error.read().clone()
    }

    /// Replace the record set.
    pub fn set_records(&self, set: RecordSet) {
        self.catalog.missing_columns(&set);
        *self.records.write() = Some(Arc::new(set));
        *self.source_error.write() = None;
    }

    /// (Re)load records from the configured source. On failure the previous
    /// record set stays in place.
    pub fn reload_records(&self) -> Result<usize> {
        let path = &self.config.data_paths.records_file;
        match load_records(path) {
            Ok(set) => {
                let count = set.len();
                self.set_records(set);
                info!("Record source ready: {} records", count);
                Ok(count)
            }
            Err(e) => {
                warn!("Failed to load records from {}: {}", path.display(), e);
                *self.source_error.write() = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Build a report for `selection`. Blocking: analyzer calls run inline
    /// or on scoped worker threads.
    pub fn report(&self, set: &RecordSet, selection: &FilterSelection) -> FeedbackReport {
        ReportPipeline::new(&self.catalog, self.analyzer.clone())
            .with_workers(self.config.analyzer_workers)
            .run(set, selection)
    }
}
