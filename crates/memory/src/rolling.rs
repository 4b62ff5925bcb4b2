//! Rolling in-memory conversation window.

use async_trait::async_trait;
use council_core::memory::{ConversationStore, DEFAULT_CAPACITY};
use council_core::message::Message;
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::debug;

/// Keeps the most recent `capacity` entries in insertion order.
///
/// Prompts are stored as user messages and answers as assistant messages.
/// `record` appends and truncates under one write lock, so two concurrent
/// runs never observe a half-recorded turn. A run's read and its later write
/// are separate steps, though, and overlapping runs may interleave between
/// them.
pub struct RollingMemory {
    capacity: usize,
    entries: RwLock<VecDeque<Message>>,
}

impl RollingMemory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity + 2)),
        }
    }
}

impl Default for RollingMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for RollingMemory {
    fn name(&self) -> &str {
        "rolling"
    }

    async fn recent_turns(&self, limit: usize) -> Vec<Message> {
        let entries = self.entries.read().await;
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    async fn record(&self, prompt: &str, answer: &str) {
        let mut entries = self.entries.write().await;
        entries.push_back(Message::user(prompt));
        entries.push_back(Message::assistant(answer));

        let overflow = entries.len().saturating_sub(self.capacity);
        if overflow > 0 {
            entries.drain(..overflow);
        }
        debug!(entries = entries.len(), dropped = overflow, "Conversation memory recorded");
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_core::message::Role;

    fn contents(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.content.as_str()).collect()
    }

    #[tokio::test]
    async fn record_appends_prompt_then_answer() {
        let mem = RollingMemory::new();
        mem.record("What is Rust?", "A systems language.").await;

        let turns = mem.recent_turns(6).await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "What is Rust?");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "A systems language.");
    }

    #[tokio::test]
    async fn length_grows_by_two_until_capacity() {
        let mem = RollingMemory::new();
        for i in 0..10 {
            let before = mem.len().await;
            mem.record(&format!("p{i}"), &format!("a{i}")).await;
            assert_eq!(mem.len().await, (before + 2).min(12));
        }
    }

    #[tokio::test]
    async fn overflow_keeps_most_recent_in_order() {
        let mem = RollingMemory::new();
        for i in 0..8 {
            mem.record(&format!("p{i}"), &format!("a{i}")).await;
        }

        let all = mem.recent_turns(100).await;
        assert_eq!(all.len(), 12);
        assert_eq!(all.first().unwrap().content, "p2");
        assert_eq!(all.last().unwrap().content, "a7");
    }

    #[tokio::test]
    async fn recent_turns_returns_tail_oldest_first() {
        let mem = RollingMemory::new();
        for i in 0..5 {
            mem.record(&format!("p{i}"), &format!("a{i}")).await;
        }

        let recent = mem.recent_turns(6).await;
        assert_eq!(contents(&recent), vec!["p2", "a2", "p3", "a3", "p4", "a4"]);
    }

    #[tokio::test]
    async fn reading_has_no_side_effect() {
        let mem = RollingMemory::new();
        mem.record("Compare X and Y", "X wins.").await;

        let first = mem.recent_turns(6).await;
        let second = mem.recent_turns(6).await;
        assert_eq!(first, second);
        assert_eq!(mem.len().await, 2);
    }

    #[tokio::test]
    async fn odd_capacity_still_bounds() {
        let mem = RollingMemory::with_capacity(3);
        mem.record("p0", "a0").await;
        mem.record("p1", "a1").await;
        assert_eq!(contents(&mem.recent_turns(10).await), vec!["a0", "p1", "a1"]);
    }

    #[tokio::test]
    async fn clear_all() {
        let mem = RollingMemory::new();
        mem.record("p", "a").await;
        mem.clear().await;
        assert!(mem.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_records_stay_bounded() {
        let mem = std::sync::Arc::new(RollingMemory::new());
        let mut handles = Vec::new();
        for i in 0..20 {
            let mem = mem.clone();
            handles.push(tokio::spawn(async move {
                mem.record(&format!("p{i}"), &format!("a{i}")).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let all = mem.recent_turns(100).await;
        assert_eq!(all.len(), 12);
        // Pairs are never split: user and assistant alternate.
        for pair in all.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
            assert_eq!(pair[0].content[1..], pair[1].content[1..]);
        }
    }
}
