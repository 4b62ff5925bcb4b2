//! Typed progress channel between the pipeline and its consumers.

use council_core::event::ProgressEvent;
use tokio::sync::mpsc;
use tracing::debug;

/// Where a run reports its progress.
///
/// Emitting never fails: a sink without a receiver (or whose receiver went
/// away) simply drops the event.
#[derive(Clone, Default)]
pub struct ProgressSink {
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl ProgressSink {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that discards every event.
    pub fn none() -> Self {
        Self { tx: None }
    }

    pub async fn emit(&self, event: ProgressEvent) {
        debug!(kind = event.kind(), line = %event, "Progress");
        if let Some(tx) = &self.tx {
            let _ = tx.send(event).await;
        }
    }
}
