//! Analyzer provider types.

use serde::{Deserialize, Serialize};

/// Hosted LLM provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    OpenAI,
    Anthropic,
    Groq,
}

impl LLMProvider {
    /// Chat endpoint for the provider.
    pub fn endpoint(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "https://api.openai.com/v1/chat/completions",
            LLMProvider::Groq => "https://api.groq.com/openai/v1/chat/completions",
            LLMProvider::Anthropic => "https://api.anthropic.com/v1/messages",
        }
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Groq => write!(f, "groq"),
        }
    }
}

/// Analyzer status as reported to clients (keys masked).
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzerStatus {
    #[serde(rename = "preferredProvider")]
    pub preferred_provider: String,
    #[serde(rename = "openaiConfigured")]
    pub openai_configured: bool,
    #[serde(rename = "anthropicConfigured")]
    pub anthropic_configured: bool,
    #[serde(rename = "groqConfigured")]
    pub groq_configured: bool,
    #[serde(rename = "activeProvider")]
    pub active_provider: Option<String>,
}
