//! Report pipeline: filter, group, aggregate, and project raw feedback.

use std::sync::Arc;
use std::time::Instant;

use feedlens_analyze::TextAnalyzer;
use feedlens_records::{Record, RecordSet};
use serde::Serialize;
use tracing::info;

use crate::aggregator::{Aggregator, ResultRow};
use crate::catalog::QuestionCatalog;
use crate::grouping::{group_records, GroupKey, GroupingMode};
use crate::raw::{project_raw_feedback, RawFeedbackRow};
use crate::selection::FilterSelection;

pub const NO_DATA_MESSAGE: &str = "No data found for the selected event(s).";

/// Everything the presentation layer needs for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReport {
    pub mode: GroupingMode,
    pub groups: Vec<GroupKey>,
    pub rows: Vec<ResultRow>,
    pub raw: Vec<RawFeedbackRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub analyzer: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
}

impl FeedbackReport {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Recomputes a report from scratch for each selection.
pub struct ReportPipeline<'c> {
    catalog: &'c QuestionCatalog,
    analyzer: Arc<dyn TextAnalyzer>,
    workers: usize,
}

impl<'c> ReportPipeline<'c> {
    pub fn new(catalog: &'c QuestionCatalog, analyzer: Arc<dyn TextAnalyzer>) -> Self {
        Self {
            catalog,
            analyzer,
            workers: 1,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn run(&self, set: &RecordSet, selection: &FilterSelection) -> FeedbackReport {
        let start = Instant::now();
        let dims = self.catalog.dimensions();

        // Records without a grouping value are left out of the table and the
        // raw feedback alike.
        let grouping = GroupingMode::for_selection(selection);
        let filtered: Vec<&Record> = selection
            .apply(set, dims)
            .into_iter()
            .filter(|r| grouping.covers(r, dims))
            .collect();
        let (mode, groups) = group_records(&filtered, selection, dims);

        let (rows, raw, message) = if groups.is_empty() {
            (Vec::new(), Vec::new(), Some(NO_DATA_MESSAGE.to_string()))
        } else {
            let rows = Aggregator::new(self.catalog, self.analyzer.clone())
                .with_workers(self.workers)
                .aggregate(&groups, set.columns());
            let raw = project_raw_feedback(&filtered, set, self.catalog);
            (rows, raw, None)
        };

        let report = FeedbackReport {
            mode,
            groups: groups.into_iter().map(|g| g.key).collect(),
            rows,
            raw,
            message,
            analyzer: self.analyzer.name().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Report built: mode={:?}, records={}, groups={}, rows={}, duration={}ms",
            report.mode,
            filtered.len(),
            report.groups.len(),
            report.rows.len(),
            report.duration_ms
        );

        report
    }
}
