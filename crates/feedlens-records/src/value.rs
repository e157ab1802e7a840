//! Cell values as they come out of the record source.

use serde::{Deserialize, Deserializer, Serialize};

/// A single cell of a feedback record.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Text(String),
    Number(serde_json::Number),
    List(Vec<String>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Textual form of the cell, or `None` for a null cell.
    ///
    /// Numbers use their JSON display form (`2023`, `9.5`); lists are joined
    /// with `", "`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::List(items) => Some(items.join(", ")),
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => CellValue::Null,
            Value::String(s) => CellValue::Text(s),
            Value::Number(n) => CellValue::Number(n),
            Value::Bool(b) => CellValue::Text(b.to_string()),
            Value::Array(items) => CellValue::List(
                items
                    .into_iter()
                    .filter_map(|item| CellValue::from(item).as_text())
                    .collect(),
            ),
            Value::Object(_) => CellValue::Text(value.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.into())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n.into())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Null)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}
