//! LLM provider implementations for Deskmate.
//!
//! All providers implement the `deskmate_core::Provider` trait.

pub mod openai_compat;

use deskmate_config::AssistantConfig;
use deskmate_core::error::ProviderError;

pub use openai_compat::{OpenAiCompatProvider, classify_error};

/// Build the chat provider described by `config`.
///
/// Fails with [`ProviderError::NotConfigured`] when no API key was resolved.
pub fn build_from_config(config: &AssistantConfig) -> Result<OpenAiCompatProvider, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(format!(
            "environment variable {} is not set",
            config.llm.api_key_env
        ))
    })?;

    let name = if config.llm.base_url.contains("api.openai.com") {
        "openai"
    } else {
        "openai-compatible"
    };

    Ok(OpenAiCompatProvider::new(name, &config.llm.base_url, api_key))
}
