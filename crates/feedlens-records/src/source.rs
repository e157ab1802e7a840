//! Record source: loads feedback exports from disk.
//!
//! Supported shapes:
//! - columnar JSON: `{"Events": ["A", "B"], "Question 1": ["9", null]}`
//! - row JSON: `[{"Events": "A", "Question 1": "9"}, ...]`
//! - CSV with a header row (empty cells read as null)

use std::io::Read;
use std::path::Path;

use feedlens_core::{Error, Result};
use serde_json::Value;
use tracing::info;

use crate::record::RecordSet;
use crate::value::CellValue;

/// Load a record set from a file. A `.csv` extension selects the CSV reader;
/// anything else is parsed as JSON.
pub fn load_records(path: &Path) -> Result<RecordSet> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let set = if is_csv {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Source(format!("{}: {}", path.display(), e)))?;
        parse_csv(file)?
    } else {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Source(format!("{}: {}", path.display(), e)))?;
        parse_json(&text)?
    };

    info!(
        "Loaded {} records ({} columns) from {}",
        set.len(),
        set.columns().len(),
        path.display()
    );
    Ok(set)
}

/// Parse columnar or row-oriented JSON.
pub fn parse_json(text: &str) -> Result<RecordSet> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Object(columns) => parse_columnar(columns),
        Value::Array(rows) => parse_rows(rows),
        other => Err(Error::Source(format!(
            "expected a JSON object or array of records, got {}",
            json_kind(&other)
        ))),
    }
}

fn parse_columnar(columns: serde_json::Map<String, Value>) -> Result<RecordSet> {
    let mut row_count: Option<usize> = None;
    let mut cols: Vec<(String, Vec<Value>)> = Vec::with_capacity(columns.len());

    for (name, values) in columns {
        let values = match values {
            Value::Array(v) => v,
            other => {
                return Err(Error::Source(format!(
                    "column '{}' must be an array, got {}",
                    name,
                    json_kind(&other)
                )))
            }
        };
        match row_count {
            None => row_count = Some(values.len()),
            Some(n) if n != values.len() => {
                return Err(Error::Source(format!(
                    "column '{}' has {} values, expected {}",
                    name,
                    values.len(),
                    n
                )))
            }
            Some(_) => {}
        }
        cols.push((name, values));
    }

    let rows = row_count.unwrap_or(0);
    let mut iters: Vec<(String, std::vec::IntoIter<Value>)> = cols
        .into_iter()
        .map(|(name, values)| (name, values.into_iter()))
        .collect();

    let mut table: Vec<Vec<(String, CellValue)>> = Vec::with_capacity(rows);
    for _ in 0..rows {
        let row = iters
            .iter_mut()
            .map(|(name, it)| (name.clone(), it.next().map(CellValue::from).unwrap_or_default()))
            .collect();
        table.push(row);
    }

    if table.is_empty() {
        let columns = iters.into_iter().map(|(name, _)| name).collect();
        return Ok(RecordSet::with_schema(columns, Vec::new()));
    }
    Ok(RecordSet::from_rows(table))
}

fn parse_rows(rows: Vec<Value>) -> Result<RecordSet> {
    let mut table: Vec<Vec<(String, CellValue)>> = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        match row {
            Value::Object(cells) => {
                table.push(
                    cells
                        .into_iter()
                        .map(|(k, v)| (k, CellValue::from(v)))
                        .collect(),
                );
            }
            other => {
                return Err(Error::Source(format!(
                    "row {} must be an object, got {}",
                    i,
                    json_kind(&other)
                )))
            }
        }
    }
    Ok(RecordSet::from_rows(table))
}

/// Parse CSV with a header row. Cells are kept as text; empty cells are null.
pub fn parse_csv<R: Read>(reader: R) -> Result<RecordSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| Error::Csv(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table: Vec<Vec<(String, CellValue)>> = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(|e| Error::Csv(e.to_string()))?;
        let cells = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let cell = match row.get(i) {
                    Some(v) if !v.is_empty() => CellValue::Text(v.to_string()),
                    _ => CellValue::Null,
                };
                (h.clone(), cell)
            })
            .collect();
        table.push(cells);
    }

    if table.is_empty() {
        return Ok(RecordSet::with_schema(headers, Vec::new()));
    }
    Ok(RecordSet::from_rows(table))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
