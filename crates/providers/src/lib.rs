//! Completion providers for Council.
//!
//! [`OpenAiCompatProvider`] implements `council_core::Provider` against any
//! OpenAI-compatible endpoint. [`CompletionClient`] layers the bounded retry
//! and sentinel fallback on top of a provider.

pub mod client;
pub mod openai_compat;

pub use client::{CompletionClient, build_messages};
pub use openai_compat::OpenAiCompatProvider;

use council_core::error::ProviderError;
use std::sync::Arc;

/// Build the completion client described by the configuration.
///
/// Fails when no API key is available.
pub fn build_from_config(
    config: &council_config::AppConfig,
) -> Result<CompletionClient, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            ProviderError::NotConfigured(
                "no API key (set COUNCIL_API_KEY or FIREWORKS_API_KEY, or api_key in config.toml)"
                    .into(),
            )
        })?;

    let provider = OpenAiCompatProvider::with_timeout(
        &config.provider.name,
        &config.provider.api_url,
        api_key,
        config.retry.request_timeout(),
    );

    Ok(CompletionClient::new(Arc::new(provider), config.generation_params())
        .with_retries(config.retry.retries)
        .with_backoff(config.retry.backoff()))
}
