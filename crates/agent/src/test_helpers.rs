//! Shared test helpers for pipeline tests.

use async_trait::async_trait;
use council_core::error::ProviderError;
use council_core::message::Role;
use council_core::provider::{GenerationParams, Provider, ProviderRequest, ProviderResponse};
use council_memory::RollingMemory;
use council_providers::CompletionClient;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pipeline::AgentPipeline;

/// A mock provider whose answers are scripted per role.
///
/// Calls are routed by a keyword found in the request's system instruction
/// ("Researcher", "Writer", "Verifier", "Aggregator"), so the scripts hold no
/// matter in which order the concurrent calls arrive. Panics when a role has
/// no script left.
pub struct RoleScriptedProvider {
    scripts: Mutex<HashMap<String, VecDeque<Result<String, ProviderError>>>>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<(String, ProviderRequest)>>,
}

impl RoleScriptedProvider {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            delays: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every role answers `"<Role> output"`, the aggregator answers `final_text`.
    pub fn answering(final_text: &str) -> Self {
        Self::new()
            .script("Researcher", vec![Ok("Researcher output".into())])
            .script("Writer", vec![Ok("Writer output".into())])
            .script("Verifier", vec![Ok("Verifier output".into())])
            .script("Aggregator", vec![Ok(final_text.into())])
    }

    pub fn script(self, key: &str, results: Vec<Result<String, ProviderError>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(key.to_string(), results.into());
        self
    }

    /// Make calls for `key` take `delay` before answering.
    pub fn delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    pub fn calls_for(&self, key: &str) -> usize {
        self.requests_for(key).len()
    }

    pub fn requests_for(&self, key: &str) -> Vec<ProviderRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, r)| r.clone())
            .collect()
    }

    fn key_for(&self, request: &ProviderRequest) -> String {
        let system = request
            .messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let scripts = self.scripts.lock().unwrap();
        scripts
            .keys()
            .find(|k| system.contains(k.as_str()))
            .cloned()
            .unwrap_or_else(|| panic!("RoleScriptedProvider: no script matches {system:?}"))
    }
}

#[async_trait]
impl Provider for RoleScriptedProvider {
    fn name(&self) -> &str {
        "role_scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let key = self.key_for(&request);
        self.requests.lock().unwrap().push((key.clone(), request));

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| panic!("RoleScriptedProvider: script for {key} exhausted"));

        next.map(|content| ProviderResponse {
            content,
            usage: None,
            model: "mock-model".into(),
        })
    }
}

pub fn http_500() -> ProviderError {
    ProviderError::ApiError {
        status_code: 500,
        message: "boom".into(),
    }
}

/// A pipeline with the default roles and a short backoff.
pub fn pipeline(provider: Arc<RoleScriptedProvider>, memory: Arc<RollingMemory>) -> AgentPipeline {
    let client = CompletionClient::new(provider, GenerationParams::default())
        .with_backoff(Duration::from_millis(10));
    AgentPipeline::new(client, memory)
}
