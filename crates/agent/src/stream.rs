//! Plain-text progress stream.
//!
//! Turns a pipeline run into newline-terminated marker lines followed by the
//! `--- Final Answer ---` block. Each line is pushed to the sink as soon as
//! the pipeline produces it. If the sink's receiver goes away the run's
//! cancellation token is fired.

use std::sync::Arc;

use council_core::agent::PipelineOutcome;
use council_core::error::{Error, Result};
use council_core::event::{FINAL_ANSWER_MARKER, ProgressEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::pipeline::AgentPipeline;
use crate::progress::ProgressSink;

/// Buffered chunks between the run and the transport.
const STREAM_BUFFER: usize = 32;

/// One progress line, newline-terminated.
pub fn render_line(event: &ProgressEvent) -> String {
    format!("{event}\n")
}

/// The trailing block that carries the final answer.
pub fn render_final(final_answer: &str) -> String {
    format!("\n{FINAL_ANSWER_MARKER}\n{final_answer}\n")
}

/// Drive one run, writing its progress stream into `sink`.
pub async fn stream_run(
    pipeline: &AgentPipeline,
    prompt: &str,
    sink: mpsc::Sender<String>,
    cancel: &CancellationToken,
) -> Result<PipelineOutcome> {
    if sink.send(render_line(&ProgressEvent::Started)).await.is_err() {
        cancel.cancel();
        return Err(Error::Cancelled("stream receiver dropped".into()));
    }

    let (tx, mut rx) = mpsc::channel::<ProgressEvent>(STREAM_BUFFER);
    let progress = ProgressSink::new(tx);

    let run = async move {
        let result = pipeline.run(prompt, &progress, cancel).await;
        // Closing the event channel ends the forwarder.
        drop(progress);
        result
    };

    let sink_ref = &sink;
    let forward = async move {
        while let Some(event) = rx.recv().await {
            if sink_ref.send(render_line(&event)).await.is_err() {
                debug!(kind = event.kind(), "Stream receiver dropped, cancelling run");
                cancel.cancel();
                break;
            }
        }
    };

    let (result, ()) = tokio::join!(run, forward);
    let outcome = result?;

    if sink.send(render_final(&outcome.final_answer)).await.is_err() {
        warn!(run_id = %outcome.run_id, "Stream receiver dropped before the final answer");
    }
    Ok(outcome)
}

/// Spawn a run onto the runtime and hand back the receiving end of its stream.
///
/// The stream ends after the final block, or early if the run was cancelled.
pub fn spawn_stream(
    pipeline: Arc<AgentPipeline>,
    prompt: String,
    cancel: CancellationToken,
) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);
    tokio::spawn(async move {
        if let Err(e) = stream_run(&pipeline, &prompt, tx, &cancel).await {
            debug!(error = %e, "Streamed run ended early");
        }
    });
    rx
}
