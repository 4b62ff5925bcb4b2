//! Provider trait — the abstraction over the hosted completion service.
//!
//! A Provider knows how to send a list of messages to an LLM and get one text
//! answer back. It performs exactly one attempt; retries and the sentinel
//! fallback belong to the completion client built on top of it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// Default model served by the hosted completion service.
pub const DEFAULT_MODEL: &str =
    "accounts/sentientfoundation/models/dobby-unhinged-llama-3-3-70b-new";

/// Fixed generation parameters attached to every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling threshold
    pub top_p: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            temperature: 0.8,
            top_p: 0.9,
            max_tokens: 800,
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use
    pub model: String,

    /// The messages, in the order they are sent
    pub messages: Vec<Message>,

    pub temperature: f32,

    pub top_p: f32,

    pub max_tokens: u32,
}

impl ProviderRequest {
    /// Build a request from generation parameters and a message list.
    pub fn new(params: &GenerationParams, messages: Vec<Message>) -> Self {
        Self {
            model: params.model.clone(),
            messages,
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
        }
    }
}

/// A complete (non-streaming) response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated text, already trimmed and guaranteed non-empty
    pub content: String,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// Implementations must never return `Ok` with empty content: an empty
/// answer is reported as [`ProviderError::EmptyResponse`].
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "fireworks").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_defaults() {
        let params = GenerationParams::default();
        assert!((params.temperature - 0.8).abs() < f32::EPSILON);
        assert!((params.top_p - 0.9).abs() < f32::EPSILON);
        assert_eq!(params.max_tokens, 800);
        assert_eq!(params.model, DEFAULT_MODEL);
    }

    #[test]
    fn request_copies_params() {
        let params = GenerationParams {
            model: "mock-model".into(),
            ..GenerationParams::default()
        };
        let req = ProviderRequest::new(&params, vec![Message::user("hi")]);
        assert_eq!(req.model, "mock-model");
        assert_eq!(req.max_tokens, 800);
        assert_eq!(req.messages.len(), 1);
    }
}
