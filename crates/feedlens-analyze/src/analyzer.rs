//! The analyzer strategy trait.

use feedlens_core::Result;

/// Summarizer and theme extractor behind one interchangeable contract.
///
/// Both methods return an empty string for empty or whitespace-only input
/// without contacting any backend. For non-empty input they return a
/// non-empty description, or an error the caller is expected to absorb.
pub trait TextAnalyzer: Send + Sync {
    /// Reduce feedback text to one descriptive sentence.
    fn summarize(&self, text: &str) -> Result<String>;

    /// List recurring themes with mention counts.
    fn extract_themes(&self, text: &str) -> Result<String>;

    /// Backend identifier ("local", "openai", "anthropic", "groq").
    fn name(&self) -> &str;
}
