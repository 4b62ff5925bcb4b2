//! Agent role specifications and per-run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix of the sentinel text that stands in for a failed completion.
pub const SENTINEL_PREFIX: &str = "⚠️ Error: ";

/// System instruction of the final merge call.
pub const AGGREGATOR_INSTRUCTION: &str =
    "You are Aggregator Dobby. Merge all insights into a concise, well-structured final answer.";

/// Unique identifier for a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fixed role/system-instruction pair applied to every prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Role name, unique within a pipeline (e.g. "Researcher")
    pub role: String,

    /// System instruction sent with every call for this role
    pub system_instruction: String,
}

impl AgentSpec {
    pub fn new(role: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            system_instruction: system_instruction.into(),
        }
    }
}

/// The built-in Researcher, Writer and Verifier roles, in declaration order.
pub fn default_agents() -> Vec<AgentSpec> {
    vec![
        AgentSpec::new(
            "Researcher",
            "You are Researcher Dobby.\n\
             - Gather factual, up-to-date, verifiable data.\n\
             - Avoid speculation.\n\
             - Return concise bullet points with sources if possible.",
        ),
        AgentSpec::new(
            "Writer",
            "You are Writer Dobby.\n\
             - Translate complex data into clear, human-readable insights.\n\
             - Use simple analogies.\n\
             - Maintain a confident, neutral tone.",
        ),
        AgentSpec::new(
            "Verifier",
            "You are Verifier Dobby.\n\
             - Evaluate accuracy, logic, and clarity.\n\
             - Highlight contradictions or weak reasoning.\n\
             - Keep output short and decisive.",
        ),
    ]
}

/// Outcome of one completion after retries.
///
/// A failure is kept distinguishable from a real answer, but [`text`](Self::text)
/// renders it as sentinel text so aggregation always has something to merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentOutput {
    Answer { text: String },
    Failed { reason: String },
}

impl AgentOutput {
    pub fn answer(text: impl Into<String>) -> Self {
        Self::Answer { text: text.into() }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Answer { .. })
    }

    /// The answer text, or `⚠️ Error: <reason>` for a failure.
    pub fn text(&self) -> String {
        match self {
            Self::Answer { text } => text.clone(),
            Self::Failed { reason } => format!("{SENTINEL_PREFIX}{reason}"),
        }
    }
}

/// One role's contribution to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResult {
    pub role: String,
    pub output: AgentOutput,
}

/// The value returned by a completed pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub run_id: RunId,

    /// The aggregated answer (sentinel text if aggregation itself failed)
    pub final_answer: String,

    /// One result per agent, in declaration order
    pub agents: Vec<AgentResult>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
