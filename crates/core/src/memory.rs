//! Conversation memory trait — a bounded rolling window of past turns.
//!
//! Each completed run records its prompt and final answer. Later runs read
//! the most recent entries back as extra context for every agent call.

use async_trait::async_trait;

use crate::message::Message;

/// Maximum number of entries kept (six prompt/answer turns).
pub const DEFAULT_CAPACITY: usize = 12;

/// Number of entries handed to each completion call.
pub const DEFAULT_HISTORY_LIMIT: usize = 6;

/// The core ConversationStore trait.
///
/// Implementations: rolling in-memory window, none (no-op).
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// The store name (e.g., "rolling", "none").
    fn name(&self) -> &str;

    /// The last `limit` entries, oldest first. Never mutates the store.
    async fn recent_turns(&self, limit: usize) -> Vec<Message>;

    /// Append `prompt` then `answer`, then drop the oldest entries beyond capacity.
    async fn record(&self, prompt: &str, answer: &str);

    /// Current number of entries.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Forget everything.
    async fn clear(&self);
}
