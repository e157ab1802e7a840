//! Feedlens Records: the feedback record model and the record source.
//!
//! Records arrive from a spreadsheet-like export, either as columnar JSON
//! (column name → row values), row JSON, or CSV. The schema is not fixed in
//! advance, so every column access is existence-checked.

pub mod record;
pub mod source;
pub mod value;

pub use record::{Record, RecordSet};
pub use source::{load_records, parse_csv, parse_json};
pub use value::CellValue;
