//! The Council agent pipeline.
//!
//! One run follows a fixed shape:
//!
//! 1. **Dispatch** the prompt to every agent role concurrently
//! 2. **Join** the answers in declaration order
//! 3. **Combine** them into one `--- Role ---` sectioned text block
//! 4. **Aggregate** the block with one more completion call
//! 5. **Record** the prompt and final answer into conversation memory
//!
//! Progress is reported through a typed [`ProgressSink`]; the [`stream`]
//! module turns those events into the plain-text progress stream.

pub mod pipeline;
pub mod progress;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use pipeline::{AgentPipeline, combine};
pub use progress::ProgressSink;
pub use stream::{spawn_stream, stream_run};
