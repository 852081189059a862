//! LLM integration for email triage.
//!
//! The pipeline only sees the `LlmProvider` trait. The concrete backend is
//! any OpenAI-compatible `/chat/completions` endpoint; Groq is the default.

mod openai_compat;
pub mod provider;

pub use openai_compat::OpenAiCompatProvider;
pub use provider::*;

use std::sync::Arc;

use crate::config::RemoteConfig;
use crate::error::LlmError;

/// Create an LLM provider from configuration.
pub fn create_provider(config: &RemoteConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = OpenAiCompatProvider::new(
        &config.base_url,
        config.api_key.clone(),
        &config.model,
        config.timeout,
    )?;
    tracing::info!(
        "Using OpenAI-compatible endpoint {} (model: {})",
        config.base_url,
        config.model
    );
    Ok(Arc::new(provider))
}
