//! Feedback records and the loaded record set.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::value::CellValue;

static NULL_CELL: CellValue = CellValue::Null;

/// One respondent's feedback entry, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    cells: HashMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from (column, value) pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Cell for `column`; a missing column reads as null.
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&NULL_CELL)
    }

    /// Textual value of `column`, `None` when missing or null.
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).as_text()
    }
}

/// An ordered batch of records plus the column schema observed in it.
///
/// Columns are kept in first-seen order. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordSet {
    /// Build a set from rows of ordered (column, value) pairs.
    pub fn from_rows<R, K, V>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::new();

        for row in rows {
            let mut record = Record::new();
            for (column, value) in row {
                let column = column.into();
                if seen.insert(column.clone()) {
                    columns.push(column.clone());
                }
                record.insert(column, value);
            }
            records.push(record);
        }

        Self { columns, records }
    }

    /// Build a set with an explicit schema.
    pub fn with_schema(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
