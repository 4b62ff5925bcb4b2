//! # Council Core
//!
//! Domain types, traits, and error definitions for the Council multi-agent
//! aggregator. This crate has **zero framework dependencies**. It defines the
//! domain model that the provider, memory, agent and gateway crates implement
//! against.
//!
//! ## Design Philosophy
//!
//! Every external seam is a trait here (the completion [`Provider`] and the
//! [`ConversationStore`]). Implementations live in their respective crates,
//! so tests can swap in scripted providers and in-memory stores.

pub mod agent;
pub mod error;
pub mod event;
pub mod memory;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentOutput, AgentResult, AgentSpec, PipelineOutcome, RunId};
pub use error::{Error, ProviderError, Result};
pub use event::ProgressEvent;
pub use memory::ConversationStore;
pub use message::{Message, Role};
pub use provider::{GenerationParams, Provider, ProviderRequest, ProviderResponse, Usage};
