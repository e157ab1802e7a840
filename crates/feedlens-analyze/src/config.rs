//! Analyzer configuration persistence and provider selection.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{AnalyzerStatus, LLMProvider};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Stored analyzer configuration (persisted to llm-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// "auto", "openai", "anthropic", "groq" or "local".
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            preferred_provider: default_preferred(),
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            openai_model: default_openai_model(),
            anthropic_model: default_anthropic_model(),
            groq_model: default_groq_model(),
        }
    }
}

impl AnalyzerConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Load config from file, filling missing API keys from `lookup`.
    pub fn load_with<F>(config_path: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: AnalyzerConfig = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        info!(
            "Analyzer config from {} (preferred provider: {})",
            config_path.display(),
            config.preferred_provider
        );

        if config.openai_api_key.is_none() {
            config.openai_api_key = lookup("OPENAI_API_KEY");
        }
        if config.anthropic_api_key.is_none() {
            config.anthropic_api_key = lookup("ANTHROPIC_API_KEY");
        }
        if config.groq_api_key.is_none() {
            config.groq_api_key = lookup("GROQ_API_KEY");
        }

        config
    }

    /// Resolve which hosted provider, model and key to use.
    ///
    /// `None` selects the local heuristic.
    pub fn resolve_provider(&self) -> Option<(LLMProvider, String, String)> {
        let non_empty = |k: &Option<String>| k.as_ref().filter(|k| !k.trim().is_empty()).cloned();

        match self.preferred_provider.as_str() {
            "auto" => {}
            "openai" => {
                return non_empty(&self.openai_api_key)
                    .map(|k| (LLMProvider::OpenAI, self.openai_model.clone(), k))
            }
            "anthropic" => {
                return non_empty(&self.anthropic_api_key)
                    .map(|k| (LLMProvider::Anthropic, self.anthropic_model.clone(), k))
            }
            "groq" => {
                return non_empty(&self.groq_api_key)
                    .map(|k| (LLMProvider::Groq, self.groq_model.clone(), k))
            }
            _ => return None,
        }

        // Auto mode: Anthropic > Groq > OpenAI
        if let Some(k) = non_empty(&self.anthropic_api_key) {
            return Some((LLMProvider::Anthropic, self.anthropic_model.clone(), k));
        }
        if let Some(k) = non_empty(&self.groq_api_key) {
            return Some((LLMProvider::Groq, self.groq_model.clone(), k));
        }
        if let Some(k) = non_empty(&self.openai_api_key) {
            return Some((LLMProvider::OpenAI, self.openai_model.clone(), k));
        }

        None
    }

    /// Build the public status (no API keys exposed).
    pub fn to_status(&self) -> AnalyzerStatus {
        AnalyzerStatus {
            preferred_provider: self.preferred_provider.clone(),
            openai_configured: self.openai_api_key.is_some(),
            anthropic_configured: self.anthropic_api_key.is_some(),
            groq_configured: self.groq_api_key.is_some(),
            active_provider: self.resolve_provider().map(|(p, _, _)| p.to_string()),
        }
    }
}
