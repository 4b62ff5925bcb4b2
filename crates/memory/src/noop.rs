//! No-op conversation store — disables history entirely.

use async_trait::async_trait;
use council_core::memory::ConversationStore;
use council_core::message::Message;

/// A store that remembers nothing. Every run sees an empty history.
pub struct NoopMemory;

#[async_trait]
impl ConversationStore for NoopMemory {
    fn name(&self) -> &str {
        "none"
    }

    async fn recent_turns(&self, _limit: usize) -> Vec<Message> {
        Vec::new()
    }

    async fn record(&self, _prompt: &str, _answer: &str) {}

    async fn len(&self) -> usize {
        0
    }

    async fn clear(&self) {}
}
