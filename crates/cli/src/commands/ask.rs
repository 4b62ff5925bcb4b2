//! `council ask` — Run one prompt in-process.

use std::io::Write;
use std::sync::Arc;

use council_agent::{AgentPipeline, ProgressSink, spawn_stream};
use council_config::AppConfig;
use council_gateway::GatewayState;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn run(prompt: String, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        return Err(missing_key_message().into());
    }

    let state = GatewayState::from_config(config)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling run");
            on_interrupt.cancel();
        }
    });

    if json {
        let outcome = state
            .pipeline
            .run(&prompt, &ProgressSink::none(), &cancel)
            .await?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    stream_to(state.pipeline.clone(), prompt, cancel.clone(), &mut std::io::stdout()).await?;
    if cancel.is_cancelled() {
        return Err("Run cancelled".into());
    }
    Ok(())
}

/// Copy a run's progress stream into `out`, flushing after every line.
pub async fn stream_to<W: Write>(
    pipeline: Arc<AgentPipeline>,
    prompt: String,
    cancel: CancellationToken,
    out: &mut W,
) -> std::io::Result<()> {
    let mut rx = spawn_stream(pipeline, prompt, cancel);
    while let Some(chunk) = rx.recv().await {
        out.write_all(chunk.as_bytes())?;
        out.flush()?;
    }
    Ok(())
}

pub fn missing_key_message() -> String {
    format!(
        "No API key configured.\n\
         \n  Set one of these environment variables:\
         \n    COUNCIL_API_KEY   = 'fw-...'   (generic)\
         \n    FIREWORKS_API_KEY = 'fw-...'   (Fireworks AI)\
         \n\
         \n  Or add `api_key = \"...\"` to {}",
        AppConfig::config_dir().join("config.toml").display()
    )
}
