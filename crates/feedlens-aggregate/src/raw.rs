//! Raw feedback projection shown alongside the aggregate table.

use feedlens_records::{CellValue, Record, RecordSet};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::catalog::QuestionCatalog;

/// A filtered record projected onto the display columns, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeedbackRow {
    pub cells: Vec<(String, CellValue)>,
}

impl RawFeedbackRow {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }
}

impl Serialize for RawFeedbackRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Display columns: dimension columns, then free-text question columns,
/// keeping only those present in the schema.
pub fn raw_columns<'a>(set: &RecordSet, catalog: &'a QuestionCatalog) -> Vec<&'a str> {
    let dims = catalog.dimensions();
    [
        dims.event.as_str(),
        dims.event_type.as_str(),
        dims.program_year.as_str(),
    ]
    .into_iter()
    .chain(catalog.text_columns())
    .filter(|c| set.has_column(c))
    .collect()
}

/// Project filtered records onto the display columns, in source order.
pub fn project_raw_feedback(
    records: &[&Record],
    set: &RecordSet,
    catalog: &QuestionCatalog,
) -> Vec<RawFeedbackRow> {
    let columns = raw_columns(set, catalog);
    records
        .iter()
        .map(|record| RawFeedbackRow {
            cells: columns
                .iter()
                .map(|c| (c.to_string(), record.get(c).clone()))
                .collect(),
        })
        .collect()
}
