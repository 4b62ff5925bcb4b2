//! Progress events emitted while a pipeline run advances.
//!
//! Events are typed so the pipeline stays transport-agnostic; each one renders
//! to exactly one line of the plain-text progress stream.

use serde::{Deserialize, Serialize};

/// Line that separates the progress lines from the final answer.
pub const FINAL_ANSWER_MARKER: &str = "--- Final Answer ---";

/// A point-in-time progress notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// The stream adapter accepted the prompt.
    Started,
    /// All agents were dispatched.
    Thinking,
    /// One agent's call resolved (success or sentinel).
    RoleDone { role: String },
    /// The aggregation call is about to start.
    Aggregating,
    /// The run finished and memory was recorded.
    Complete,
}

impl ProgressEvent {
    pub fn role_done(role: impl Into<String>) -> Self {
        Self::RoleDone { role: role.into() }
    }

    /// Short machine name, handy for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Thinking => "thinking",
            Self::RoleDone { .. } => "role_done",
            Self::Aggregating => "aggregating",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started => f.write_str("🧠 Starting agents..."),
            Self::Thinking => f.write_str("🤖 Agents thinking..."),
            Self::RoleDone { role } => write!(f, "✅ {role} done."),
            Self::Aggregating => f.write_str("🧩 Aggregating results..."),
            Self::Complete => f.write_str("🏁 All agents complete."),
        }
    }
}
