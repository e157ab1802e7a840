//! Aggregator: reduces every cataloged question per group to one result row.
//!
//! Row order: groups in grouping order; within a group, Numeric questions,
//! then Summary, then Theme, each in catalog order. Summary and Theme rows
//! for the same column read the same concatenated text, built once.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use feedlens_analyze::TextAnalyzer;
use rayon::prelude::*;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::catalog::{QuestionCatalog, QuestionCategory};
use crate::extract::extract_leading_number;
use crate::grouping::{Group, GroupKey};

/// Value cell of a result row. An empty `Text` means "no data".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultValue {
    Number(f64),
    Text(String),
}

impl ResultValue {
    pub fn empty() -> Self {
        ResultValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResultValue::Text(s) if s.is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResultValue::Text(s) => Some(s),
            ResultValue::Number(_) => None,
        }
    }
}

/// One (group, question, category) result.
///
/// Serializes flat: group fields, then `Question`, then `Value`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub key: GroupKey,
    pub column: String,
    pub category: QuestionCategory,
    pub value: ResultValue,
}

impl ResultRow {
    /// Question identifier with its category suffix.
    pub fn question(&self) -> String {
        format!("{}{}", self.column, self.category.suffix())
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let parts = self.key.parts();
        let mut map = serializer.serialize_map(Some(parts.len() + 2))?;
        for (dimension, value) in parts {
            map.serialize_entry(dimension.label(), value)?;
        }
        map.serialize_entry("Question", &self.question())?;
        map.serialize_entry("Value", &self.value)?;
        map.end()
    }
}

/// Mean of `values` rounded to two decimals (ties to even), `None` when empty.
pub fn rounded_mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64;
    Some((mean * 100.0).round_ties_even() / 100.0)
}

/// Space-joined text of every non-null cell of `column`, in record order.
pub fn concatenate_column(group: &Group<'_>, column: &str) -> String {
    group
        .records
        .iter()
        .filter_map(|r| r.text(column))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A pending analyzer call and the row slot it fills.
struct TextJob {
    slot: usize,
    text: usize,
    category: QuestionCategory,
}

/// Pure transform from groups to result rows.
pub struct Aggregator<'c> {
    catalog: &'c QuestionCatalog,
    analyzer: Arc<dyn TextAnalyzer>,
    workers: usize,
}

impl<'c> Aggregator<'c> {
    pub fn new(catalog: &'c QuestionCatalog, analyzer: Arc<dyn TextAnalyzer>) -> Self {
        Self {
            catalog,
            analyzer,
            workers: 1,
        }
    }

    /// Run analyzer calls on up to `workers` threads. Output is unchanged.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Aggregate `groups`. Questions whose column is absent from `schema`
    /// produce no rows.
    pub fn aggregate(&self, groups: &[Group<'_>], schema: &[String]) -> Vec<ResultRow> {
        let present = |column: &str| schema.iter().any(|c| c == column);

        let mut rows: Vec<ResultRow> = Vec::new();
        let mut texts: Vec<String> = Vec::new();
        let mut jobs: Vec<TextJob> = Vec::new();

        for group in groups {
            for column in self.catalog.columns_for(QuestionCategory::Numeric) {
                if !present(column) {
                    continue;
                }
                let values: Vec<i64> = group
                    .records
                    .iter()
                    .filter_map(|r| extract_leading_number(r.get(column)))
                    .collect();
                let value = rounded_mean(&values)
                    .map(ResultValue::Number)
                    .unwrap_or_else(ResultValue::empty);
                rows.push(ResultRow {
                    key: group.key.clone(),
                    column: column.clone(),
                    category: QuestionCategory::Numeric,
                    value,
                });
            }

            // Concatenation is computed once per (group, column).
            let mut text_index: HashMap<&str, usize> = HashMap::new();
            for category in [QuestionCategory::Summary, QuestionCategory::Theme] {
                for column in self.catalog.columns_for(category) {
                    if !present(column) {
                        continue;
                    }
                    let text = *text_index.entry(column.as_str()).or_insert_with(|| {
                        texts.push(concatenate_column(group, column));
                        texts.len() - 1
                    });
                    jobs.push(TextJob {
                        slot: rows.len(),
                        text,
                        category,
                    });
                    rows.push(ResultRow {
                        key: group.key.clone(),
                        column: column.clone(),
                        category,
                        value: ResultValue::empty(),
                    });
                }
            }
        }

        debug!(
            "Aggregating {} groups: {} rows, {} analyzer calls, {} workers",
            groups.len(),
            rows.len(),
            jobs.len(),
            self.workers
        );

        for (slot, output) in self.run_jobs(&jobs, &texts, &rows) {
            rows[slot].value = ResultValue::Text(output);
        }

        rows
    }

    /// Execute analyzer calls, returning (slot, text) pairs in job order.
    fn run_jobs(&self, jobs: &[TextJob], texts: &[String], rows: &[ResultRow]) -> Vec<(usize, String)> {
        let call = |job: &TextJob| (job.slot, self.call(job, &texts[job.text], &rows[job.slot]));

        if self.workers <= 1 || jobs.len() <= 1 {
            return jobs.iter().map(call).collect();
        }

        let threads = self.workers.min(jobs.len());
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| jobs.par_iter().map(call).collect()),
            Err(e) => {
                warn!("Analyzer pool unavailable ({}), running sequentially", e);
                jobs.iter().map(call).collect()
            }
        }
    }

    /// One analyzer call. Failures become an empty value.
    fn call(&self, job: &TextJob, text: &str, row: &ResultRow) -> String {
        let result = catch_unwind(AssertUnwindSafe(|| match job.category {
            QuestionCategory::Summary => self.analyzer.summarize(text),
            QuestionCategory::Theme => self.analyzer.extract_themes(text),
            QuestionCategory::Numeric => Ok(String::new()),
        }));
        match result {
            Ok(Ok(output)) => output,
            Err(_) => {
                warn!(
                    "{} panicked for '{}' in group {}",
                    self.analyzer.name(),
                    row.question(),
                    row.key
                );
                String::new()
            }
            Ok(Err(e)) => {
                warn!(
                    "{} failed for '{}' in group {}: {}",
                    self.analyzer.name(),
                    row.question(),
                    row.key,
                    e
                );
                String::new()
            }
        }
    }
}
