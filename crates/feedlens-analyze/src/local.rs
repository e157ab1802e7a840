//! Local word-frequency heuristic: the offline analyzer backend.

use std::collections::HashMap;

use feedlens_core::Result;

use crate::analyzer::TextAnalyzer;

/// Token count at which summaries are truncated.
pub const SUMMARY_TOKEN_LIMIT: usize = 30;
/// Marker appended to truncated summaries.
pub const TRUNCATION_MARKER: &str = "...";
/// Maximum number of themes reported.
pub const MAX_THEMES: usize = 5;

/// Deterministic analyzer that needs no network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAnalyzer;

impl LocalAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl TextAnalyzer for LocalAnalyzer {
    fn summarize(&self, text: &str) -> Result<String> {
        Ok(summarize(text))
    }

    fn extract_themes(&self, text: &str) -> Result<String> {
        Ok(extract_themes(text))
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Return `text` unchanged when it has fewer than 30 tokens, otherwise the
/// first 30 tokens joined by single spaces plus a truncation marker.
pub fn summarize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < SUMMARY_TOKEN_LIMIT {
        return text.to_string();
    }

    let mut out = tokens[..SUMMARY_TOKEN_LIMIT].join(" ");
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Top whitespace tokens by exact-match frequency, formatted one per line as
/// `token (N mentions)`. Ties keep first-occurrence order.
pub fn extract_themes(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for token in text.split_whitespace() {
        match index.get(token) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(token, counts.len());
                counts.push((token, 1));
            }
        }
    }

    // Stable sort keeps first-occurrence order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .iter()
        .take(MAX_THEMES)
        .map(|(token, count)| format!("{} ({} mentions)", token, count))
        .collect::<Vec<_>>()
        .join("\n")
}
