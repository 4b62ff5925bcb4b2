//! Completion client — one logical completion with a bounded retry.
//!
//! Wraps a [`Provider`] with the fixed generation parameters, assembles the
//! message list (history, then system instruction, then user instruction),
//! and turns a persistent failure into an [`AgentOutput::Failed`] instead of
//! an error. Every attempt and every backoff sleep races the caller's
//! cancellation token.

use council_core::agent::AgentOutput;
use council_core::error::ProviderError;
use council_core::message::Message;
use council_core::provider::{GenerationParams, Provider, ProviderRequest, ProviderResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Retries after the first failed attempt.
pub const DEFAULT_RETRIES: u32 = 1;

/// Pause before a retry.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// A provider plus generation parameters and retry policy.
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<dyn Provider>,
    params: GenerationParams,
    retries: u32,
    backoff: Duration,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn Provider>, params: GenerationParams) -> Self {
        Self {
            provider,
            params,
            retries: DEFAULT_RETRIES,
            backoff: DEFAULT_BACKOFF,
        }
    }

    /// Set how many extra attempts follow a failure.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the pause before each retry.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Complete with the configured retry budget.
    pub async fn complete(
        &self,
        system_instruction: &str,
        user_instruction: &str,
        history: &[Message],
        cancel: &CancellationToken,
    ) -> AgentOutput {
        self.complete_with_retries(
            system_instruction,
            user_instruction,
            history,
            self.retries,
            cancel,
        )
        .await
    }

    /// Complete, allowing `retries_remaining` further attempts after a failure.
    ///
    /// Every attempt reuses the same instructions and history snapshot.
    pub async fn complete_with_retries(
        &self,
        system_instruction: &str,
        user_instruction: &str,
        history: &[Message],
        mut retries_remaining: u32,
        cancel: &CancellationToken,
    ) -> AgentOutput {
        let request = ProviderRequest::new(
            &self.params,
            build_messages(history, system_instruction, user_instruction),
        );
        let label = preview(system_instruction, 25);

        loop {
            match self.attempt(request.clone(), cancel).await {
                Ok(response) => {
                    info!(
                        provider = %self.provider.name(),
                        model = %response.model,
                        instruction = %label,
                        answer = %preview(&response.content, 120),
                        "Completion succeeded"
                    );
                    if let Some(usage) = &response.usage {
                        debug!(
                            prompt_tokens = usage.prompt_tokens,
                            completion_tokens = usage.completion_tokens,
                            total_tokens = usage.total_tokens,
                            "Token usage"
                        );
                    }
                    return AgentOutput::answer(response.content);
                }
                Err(e) => {
                    warn!(
                        provider = %self.provider.name(),
                        instruction = %label,
                        error = %e,
                        retries_remaining,
                        "Completion attempt failed"
                    );

                    if retries_remaining == 0 || !e.is_retryable() {
                        return AgentOutput::failed(e.to_string());
                    }
                    retries_remaining -= 1;

                    info!(backoff_ms = self.backoff.as_millis() as u64, "Retrying completion");
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            return AgentOutput::failed(ProviderError::Cancelled.to_string());
                        }
                        _ = tokio::time::sleep(self.backoff) => {}
                    }
                }
            }
        }
    }

    /// One provider call, raced against cancellation.
    async fn attempt(
        &self,
        request: ProviderRequest,
        cancel: &CancellationToken,
    ) -> Result<ProviderResponse, ProviderError> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let mut response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = self.provider.complete(request) => result?,
        };

        // Providers promise non-empty content; hold them to it.
        let trimmed = response.content.trim();
        if trimmed.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        if trimmed.len() != response.content.len() {
            response.content = trimmed.to_string();
        }
        Ok(response)
    }
}

/// History entries first, then the system instruction, then the user instruction.
pub fn build_messages(
    history: &[Message],
    system_instruction: &str,
    user_instruction: &str,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.extend_from_slice(history);
    messages.push(Message::system(system_instruction));
    messages.push(Message::user(user_instruction));
    messages
}

fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let mut out: String = trimmed.chars().take(max_chars).collect();
    if trimmed.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}
