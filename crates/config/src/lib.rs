//! Configuration loading, validation, and management for Council.
//!
//! Loads configuration from `~/.council/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use council_core::agent::{AGGREGATOR_INSTRUCTION, AgentSpec, default_agents};
use council_core::memory::{DEFAULT_CAPACITY, DEFAULT_HISTORY_LIMIT};
use council_core::provider::{DEFAULT_MODEL, GenerationParams};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.council/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// System instruction of the final merge call
    #[serde(default = "default_aggregator_instruction")]
    pub aggregator_instruction: String,

    /// Completion service endpoint and model
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Sampling parameters sent with every request
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Retry policy of the completion client
    #[serde(default)]
    pub retry: RetryConfig,

    /// Conversation memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Agent roles, in declaration order
    #[serde(default = "default_agent_configs")]
    pub agents: Vec<AgentConfig>,
}

fn default_aggregator_instruction() -> String {
    AGGREGATOR_INSTRUCTION.into()
}

fn default_agent_configs() -> Vec<AgentConfig> {
    default_agents()
        .into_iter()
        .map(|spec| AgentConfig {
            role: spec.role,
            instruction: spec.system_instruction,
        })
        .collect()
}

fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("aggregator_instruction", &self.aggregator_instruction)
            .field("provider", &self.provider)
            .field("generation", &self.generation)
            .field("retry", &self.retry)
            .field("memory", &self.memory)
            .field("gateway", &self.gateway)
            .field("agents", &self.agents)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Display name used in logs
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// Base URL of the OpenAI-compatible API (without `/chat/completions`)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_model")]
    pub model: String,
}

fn default_provider_name() -> String {
    "fireworks".into()
}
fn default_api_url() -> String {
    "https://api.fireworks.ai/inference/v1".into()
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            api_url: default_api_url(),
            model: default_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.8
}
fn default_top_p() -> f32 {
    0.9
}
fn default_max_tokens() -> u32 {
    800
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Extra attempts after the first failure
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Pause before each retry
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Per-attempt HTTP timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_retries() -> u32 {
    1
}
fn default_backoff_ms() -> u64 {
    1000
}
fn default_request_timeout_secs() -> u64 {
    120
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// When false, runs neither read nor record history
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum entries kept (prompt and answer count separately)
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Entries handed to each agent call
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Also hand history to the aggregation call
    #[serde(default)]
    pub include_in_aggregation: bool,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}
fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_capacity(),
            history_limit: default_history_limit(),
            include_in_aggregation: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default)]
    pub allow_public_bind: bool,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allow_public_bind: false,
        }
    }
}

/// One agent role as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub role: String,
    pub instruction: String,
}

impl AppConfig {
    /// Load configuration from the default path (~/.council/config.toml).
    ///
    /// Environment variables override the file:
    /// - `COUNCIL_API_KEY`, then `FIREWORKS_API_KEY` (when no key is configured)
    /// - `COUNCIL_MODEL`
    /// - `COUNCIL_API_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("COUNCIL_API_KEY")
                .ok()
                .or_else(|| std::env::var("FIREWORKS_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("COUNCIL_MODEL") {
            config.provider.model = model;
        }

        if let Ok(url) = std::env::var("COUNCIL_API_URL") {
            config.provider.api_url = url;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".council")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.generation.top_p <= 0.0 || self.generation.top_p > 1.0 {
            return Err(ConfigError::ValidationError(
                "generation.top_p must be in (0.0, 1.0]".into(),
            ));
        }

        if self.generation.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_tokens must be > 0".into(),
            ));
        }

        if self.agents.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one agent must be configured".into(),
            ));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.role.trim().is_empty() || agent.instruction.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "agent role and instruction must be non-empty".into(),
                ));
            }
            if !seen.insert(agent.role.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate agent role: {}",
                    agent.role
                )));
            }
        }

        if self.aggregator_instruction.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "aggregator_instruction must be non-empty".into(),
            ));
        }

        if self.memory.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "memory.capacity must be > 0".into(),
            ));
        }

        if self.gateway.host == "0.0.0.0" && !self.gateway.allow_public_bind {
            return Err(ConfigError::ValidationError(
                "gateway.host is 0.0.0.0 but allow_public_bind is false".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Generation parameters for every completion request.
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            model: self.provider.model.clone(),
            temperature: self.generation.temperature,
            top_p: self.generation.top_p,
            max_tokens: self.generation.max_tokens,
        }
    }

    /// Agent roles as domain specs, in declaration order.
    pub fn agent_specs(&self) -> Vec<AgentSpec> {
        self.agents
            .iter()
            .map(|a| AgentSpec::new(a.role.clone(), a.instruction.clone()))
            .collect()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            aggregator_instruction: default_aggregator_instruction(),
            provider: ProviderConfig::default(),
            generation: GenerationConfig::default(),
            retry: RetryConfig::default(),
            memory: MemoryConfig::default(),
            gateway: GatewayConfig::default(),
            agents: default_agent_configs(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
