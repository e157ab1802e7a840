//! Text analysis backends for feedback summaries and themes.
//!
//! Every backend implements `TextAnalyzer`. The hosted backend calls an
//! external LLM; `LocalAnalyzer` is a deterministic word-frequency heuristic
//! used when no provider is configured.

pub mod analyzer;
pub mod config;
pub mod hosted;
pub mod local;
pub mod types;

pub use analyzer::TextAnalyzer;
pub use config::AnalyzerConfig;
pub use hosted::HostedAnalyzer;
pub use local::LocalAnalyzer;
pub use types::LLMProvider;

use std::sync::Arc;
use std::time::Duration;

/// Create the best available analyzer for the given configuration.
///
/// Uses the hosted provider when one resolves, falls back to the local
/// heuristic otherwise.
pub fn create_analyzer(config: &AnalyzerConfig, timeout: Duration) -> Arc<dyn TextAnalyzer> {
    if let Some((provider, model, api_key)) = config.resolve_provider() {
        match HostedAnalyzer::new(provider, &model, &api_key, timeout) {
            Ok(analyzer) => {
                tracing::info!("Using hosted analyzer ({} / {})", provider, model);
                return Arc::new(analyzer);
            }
            Err(e) => {
                tracing::warn!("Hosted analyzer unavailable: {}. Falling back to local heuristic.", e);
            }
        }
    } else {
        tracing::info!("No LLM provider configured. Using local heuristic analyzer.");
    }

    Arc::new(LocalAnalyzer::new())
}
