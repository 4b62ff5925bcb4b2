//! Error types for the Council domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Council operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Run lifecycle ---
    #[error("Run cancelled: {0}")]
    Cancelled(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of a single completion attempt.
///
/// The `Display` text is what ends up embedded in the sentinel answer
/// (`⚠️ Error: <reason>`), so variants render short, human-readable reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("HTTP {status_code}")]
    ApiError { status_code: u16, message: String },

    /// 401 or 403. Renders like any other status, but is never retried.
    #[error("HTTP {status_code}")]
    AuthenticationFailed { status_code: u16 },

    #[error("Empty response")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::Cancelled | Self::NotConfigured(_) | Self::AuthenticationFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_status() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 503,
            message: "upstream overloaded".into(),
        });
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn empty_response_reason() {
        assert_eq!(ProviderError::EmptyResponse.to_string(), "Empty response");
    }

    #[test]
    fn cancellation_is_not_retryable() {
        assert!(!ProviderError::Cancelled.is_retryable());
        assert!(ProviderError::EmptyResponse.is_retryable());
        assert!(ProviderError::Network("reset".into()).is_retryable());
    }

    #[test]
    fn auth_failure_reads_as_status_and_is_final() {
        let err = ProviderError::AuthenticationFailed { status_code: 401 };
        assert_eq!(err.to_string(), "HTTP 401");
        assert!(!err.is_retryable());
    }

    #[test]
    fn config_error_carries_message() {
        let err = Error::Config {
            message: "top_p must be in (0, 1]".into(),
        };
        assert_eq!(err.to_string(), "Configuration error: top_p must be in (0, 1]");
    }
}
