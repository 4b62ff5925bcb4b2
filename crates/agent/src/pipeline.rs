//! Fan-out / aggregate pipeline.
//!
//! Every configured role answers the same prompt concurrently. The answers
//! are combined in declaration order, merged by one aggregation call, and the
//! prompt plus the final answer are recorded into conversation memory.

use std::sync::Arc;

use chrono::Utc;
use council_config::AppConfig;
use council_core::agent::{
    AGGREGATOR_INSTRUCTION, AgentResult, AgentSpec, PipelineOutcome, RunId, default_agents,
};
use council_core::error::{Error, Result};
use council_core::event::ProgressEvent;
use council_core::memory::{ConversationStore, DEFAULT_HISTORY_LIMIT};
use council_providers::CompletionClient;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::progress::ProgressSink;

/// The Researcher/Writer/Verifier fan-out followed by one aggregation call.
pub struct AgentPipeline {
    client: CompletionClient,
    memory: Arc<dyn ConversationStore>,
    agents: Vec<AgentSpec>,
    aggregator_instruction: String,
    history_limit: usize,
    include_history_in_aggregation: bool,
}

impl AgentPipeline {
    /// A pipeline with the built-in roles and aggregator instruction.
    pub fn new(client: CompletionClient, memory: Arc<dyn ConversationStore>) -> Self {
        Self {
            client,
            memory,
            agents: default_agents(),
            aggregator_instruction: AGGREGATOR_INSTRUCTION.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            include_history_in_aggregation: false,
        }
    }

    /// Build from configuration: roles, aggregator instruction and history settings.
    pub fn from_config(
        client: CompletionClient,
        memory: Arc<dyn ConversationStore>,
        config: &AppConfig,
    ) -> Self {
        Self::new(client, memory)
            .with_agents(config.agent_specs())
            .with_aggregator_instruction(config.aggregator_instruction.clone())
            .with_history_limit(config.memory.history_limit)
            .with_history_in_aggregation(config.memory.include_in_aggregation)
    }

    pub fn with_agents(mut self, agents: Vec<AgentSpec>) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_aggregator_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.aggregator_instruction = instruction.into();
        self
    }

    /// How many memory entries each call receives as context.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Whether the aggregation call also receives the memory snapshot.
    pub fn with_history_in_aggregation(mut self, include: bool) -> Self {
        self.include_history_in_aggregation = include;
        self
    }

    pub fn agents(&self) -> &[AgentSpec] {
        &self.agents
    }

    pub fn memory(&self) -> &Arc<dyn ConversationStore> {
        &self.memory
    }

    /// Run one prompt through every role, aggregate, and record.
    ///
    /// Role failures never abort the run; they surface as sentinel text in the
    /// combined block. The only error is cancellation, in which case nothing
    /// is recorded.
    pub async fn run(
        &self,
        prompt: &str,
        progress: &ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutcome> {
        let run_id = RunId::new();
        let started_at = Utc::now();
        info!(
            run_id = %run_id,
            agents = self.agents.len(),
            prompt_chars = prompt.chars().count(),
            "Pipeline run started"
        );

        // One snapshot serves every call in this run.
        let history = self.memory.recent_turns(self.history_limit).await;
        debug!(run_id = %run_id, history = history.len(), "Memory snapshot taken");

        progress.emit(ProgressEvent::Thinking).await;

        let calls = self.agents.iter().map(|agent| {
            let history = &history;
            async move {
                let output = self
                    .client
                    .complete(&agent.system_instruction, prompt, history, cancel)
                    .await;
                if !output.is_ok() {
                    warn!(role = %agent.role, reason = %output.text(), "Agent failed");
                }
                progress.emit(ProgressEvent::role_done(&agent.role)).await;
                AgentResult {
                    role: agent.role.clone(),
                    output,
                }
            }
        });
        let agents = join_all(calls).await;

        if cancel.is_cancelled() {
            info!(run_id = %run_id, "Pipeline run cancelled before aggregation");
            return Err(Error::Cancelled(format!("run {run_id} cancelled")));
        }

        let combined = combine(&agents);
        progress.emit(ProgressEvent::Aggregating).await;

        let aggregation_history = if self.include_history_in_aggregation {
            history.as_slice()
        } else {
            &[]
        };
        let final_output = self
            .client
            .complete(&self.aggregator_instruction, &combined, aggregation_history, cancel)
            .await;

        if cancel.is_cancelled() {
            info!(run_id = %run_id, "Pipeline run cancelled during aggregation");
            return Err(Error::Cancelled(format!("run {run_id} cancelled")));
        }

        let final_answer = final_output.text();
        self.memory.record(prompt, &final_answer).await;
        progress.emit(ProgressEvent::Complete).await;

        let finished_at = Utc::now();
        info!(
            run_id = %run_id,
            failed = agents.iter().filter(|a| !a.output.is_ok()).count(),
            aggregated = final_output.is_ok(),
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "Pipeline run complete"
        );

        Ok(PipelineOutcome {
            run_id,
            final_answer,
            agents,
            started_at,
            finished_at,
        })
    }
}

/// `--- Role ---` headed sections, blank-line separated, in the given order.
pub fn combine(results: &[AgentResult]) -> String {
    results
        .iter()
        .map(|r| format!("--- {} ---\n{}", r.role, r.output.text()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
