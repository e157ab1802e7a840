//! Hosted LLM analyzer (OpenAI, Groq, Anthropic).
//!
//! OpenAI and Groq share the chat-completions format. Anthropic uses the
//! Messages API. Calls are blocking; the HTTP client enforces the timeout.

use std::time::Duration;

use feedlens_core::{Error, Result};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::analyzer::TextAnalyzer;
use crate::types::LLMProvider;

const MAX_TOKENS: usize = 300;
const TEMPERATURE: f64 = 0.3;

const SUMMARY_PROMPT: &str = "Summarize the following event feedback in one sentence. \
Reply with the sentence only.";

const THEMES_PROMPT: &str = "Identify the 3 to 5 most common themes in the following event \
feedback. Reply with one theme per line, formatted as 'Theme (N mentions)'.";

/// Analyzer backed by an external LLM API.
pub struct HostedAnalyzer {
    client: Client,
    provider: LLMProvider,
    model: String,
    api_key: String,
}

impl HostedAnalyzer {
    pub fn new(provider: LLMProvider, model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config(format!("{} API key not set", provider)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            client,
            provider,
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Run one instruction over `text`; empty input never reaches the API.
    fn run(&self, instruction: &str, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let body = request_body(self.provider, &self.model, instruction, text);
        debug!("Calling {} with model {}", self.provider, self.model);

        let request = self.client.post(self.provider.endpoint()).json(&body);
        let request = match self.provider {
            LLMProvider::Anthropic => request
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01"),
            LLMProvider::OpenAI | LLMProvider::Groq => {
                request.header("Authorization", format!("Bearer {}", self.api_key))
            }
        };

        let response = request
            .send()
            .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Analyzer(format!("API error {}: {}", status, body)));
        }

        let parsed: Value = response
            .json()
            .map_err(|e| Error::Analyzer(format!("Invalid response body: {}", e)))?;

        parse_completion(self.provider, &parsed)
    }
}

impl TextAnalyzer for HostedAnalyzer {
    fn summarize(&self, text: &str) -> Result<String> {
        self.run(SUMMARY_PROMPT, text)
    }

    fn extract_themes(&self, text: &str) -> Result<String> {
        self.run(THEMES_PROMPT, text)
    }

    fn name(&self) -> &str {
        match self.provider {
            LLMProvider::OpenAI => "openai",
            LLMProvider::Anthropic => "anthropic",
            LLMProvider::Groq => "groq",
        }
    }
}

/// Build the provider-specific request payload.
fn request_body(provider: LLMProvider, model: &str, instruction: &str, text: &str) -> Value {
    match provider {
        LLMProvider::Anthropic => json!({
            "model": model,
            "system": instruction,
            "messages": [{"role": "user", "content": text}],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        }),
        LLMProvider::OpenAI | LLMProvider::Groq => json!({
            "model": model,
            "messages": [
                {"role": "system", "content": instruction},
                {"role": "user", "content": text},
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        }),
    }
}

/// Pull the completion text out of a provider response.
fn parse_completion(provider: LLMProvider, response: &Value) -> Result<String> {
    let text = match provider {
        LLMProvider::Anthropic => response["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b["type"] == "text")
                    .filter_map(|b| b["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default(),
        LLMProvider::OpenAI | LLMProvider::Groq => response["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(Error::Analyzer(format!("{} returned an empty completion", provider)));
    }
    Ok(text.to_string())
}
