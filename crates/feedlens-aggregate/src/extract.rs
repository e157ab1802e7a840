//! Leading-number extraction from rating cells ("9-Great", "7", "10 - Excellent").

use feedlens_records::CellValue;
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([0-9]+)").unwrap());

/// Numeric rating for a cell: the run of ASCII digits at the start of its
/// left-trimmed text. Null cells and text starting with anything else
/// (words, emoji, a sign) yield `None`.
pub fn extract_leading_number(cell: &CellValue) -> Option<i64> {
    cell.as_text().and_then(|text| leading_number(&text))
}

/// String form of [`extract_leading_number`]. Saturates at `i64::MAX`.
pub fn leading_number(text: &str) -> Option<i64> {
    let digits = LEADING_DIGITS.captures(text)?.get(1)?.as_str();
    Some(digits.bytes().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    }))
}
