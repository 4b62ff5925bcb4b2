//! HTTP API.
//!
//! Endpoints:
//!
//! - `GET    /health`        — Liveness and version
//! - `POST   /api/run`       — Run a prompt, stream progress lines as text/plain
//! - `POST   /api/run/sync`  — Run a prompt, return the outcome as JSON
//! - `GET    /api/memory`    — Current conversation memory
//! - `DELETE /api/memory`    — Forget the conversation memory

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use council_agent::{ProgressSink, spawn_stream};
use council_core::agent::PipelineOutcome;
use council_core::error::Error;
use council_core::message::Message;

use crate::SharedState;

/// Build the health and `/api` routes.
pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/run", post(run_stream_handler))
        .route("/api/run/sync", post(run_sync_handler))
        .route("/api/memory", get(get_memory_handler).delete(clear_memory_handler))
}

// ── Types ─────────────────────────────────────────────────────────────────

/// Body of both run endpoints. Unknown fields are ignored and the prompt is
/// forwarded as-is, even when empty.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub run_id: String,
    #[serde(rename = "final")]
    pub final_answer: String,
    pub agents: Vec<AgentEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentEntry {
    pub role: String,
    pub output: String,
    pub ok: bool,
}

impl From<PipelineOutcome> for RunResponse {
    fn from(outcome: PipelineOutcome) -> Self {
        Self {
            run_id: outcome.run_id.to_string(),
            final_answer: outcome.final_answer,
            agents: outcome
                .agents
                .into_iter()
                .map(|a| AgentEntry {
                    ok: a.output.is_ok(),
                    output: a.output.text(),
                    role: a.role,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryResponse {
    pub store: String,
    pub count: usize,
    pub entries: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /api/run` — stream progress lines, then the final answer.
///
/// The run is cancelled when the response body is dropped, which is how a
/// client disconnect shows up.
async fn run_stream_handler(
    State(state): State<SharedState>,
    Json(payload): Json<RunRequest>,
) -> Response {
    info!(prompt_chars = payload.prompt.chars().count(), "api/run stream request");

    let cancel = CancellationToken::new();
    let rx = spawn_stream(state.pipeline.clone(), payload.prompt, cancel.clone());

    let guard = cancel.drop_guard();
    let stream = ReceiverStream::new(rx).map(move |chunk| {
        // The guard lives as long as the body.
        let _guard = &guard;
        Ok::<_, Infallible>(chunk)
    });

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

/// `POST /api/run/sync` — run to completion and return JSON.
async fn run_sync_handler(
    State(state): State<SharedState>,
    Json(payload): Json<RunRequest>,
) -> Result<Json<RunResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(prompt_chars = payload.prompt.chars().count(), "api/run/sync request");

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match state
        .pipeline
        .run(&payload.prompt, &ProgressSink::none(), &cancel)
        .await
    {
        Ok(outcome) => Ok(Json(outcome.into())),
        Err(e) => {
            warn!(error = %e, "Synchronous run failed");
            let status = match e {
                Error::Cancelled(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((status, Json(ErrorResponse { error: e.to_string() })))
        }
    }
}

/// `GET /api/memory` — every entry currently held, oldest first.
async fn get_memory_handler(State(state): State<SharedState>) -> Json<MemoryResponse> {
    let count = state.memory.len().await;
    let entries = state.memory.recent_turns(count).await;
    Json(MemoryResponse {
        store: state.memory.name().to_string(),
        count: entries.len(),
        entries,
    })
}

/// `DELETE /api/memory`
async fn clear_memory_handler(State(state): State<SharedState>) -> StatusCode {
    state.memory.clear().await;
    info!("Conversation memory cleared");
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn run_streams_markers_then_final_answer() {
        let state = test_state();
        let app = crate::build_router(state.clone());

        let response = app
            .oneshot(post_json("/api/run", serde_json::json!({ "prompt": "Compare X and Y" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
        assert_eq!(content_type, "text/plain; charset=utf-8");

        let text = body_text(response).await;
        assert!(text.starts_with("🧠 Starting agents...\n🤖 Agents thinking...\n"));
        assert!(text.contains("✅ Researcher done.\n"));
        assert!(text.contains("✅ Writer done.\n"));
        assert!(text.contains("✅ Verifier done.\n"));
        assert!(text.contains("🧩 Aggregating results...\n🏁 All agents complete.\n"));
        assert!(text.ends_with("\n--- Final Answer ---\nAggregator says hi\n"));

        assert_eq!(state.memory.len().await, 2);
    }

    #[tokio::test]
    async fn empty_prompt_is_forwarded() {
        let app = crate::build_router(test_state());

        let response = app
            .oneshot(post_json("/api/run", serde_json::json!({ "prompt": "", "extra": 1 })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("--- Final Answer ---"));
    }

    #[tokio::test]
    async fn missing_prompt_is_rejected() {
        let app = crate::build_router(test_state());

        let response = app
            .oneshot(post_json("/api/run", serde_json::json!({ "message": "hi" })))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn sync_run_returns_roles_in_order() {
        let app = crate::build_router(test_state());

        let response = app
            .oneshot(post_json("/api/run/sync", serde_json::json!({ "prompt": "Compare X and Y" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["final"], "Aggregator says hi");

        let roles: Vec<&str> = json["agents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["Researcher", "Writer", "Verifier"]);
        assert_eq!(json["agents"][1]["output"], "Writer says hi");
        assert_eq!(json["agents"][1]["ok"], true);
    }

    #[tokio::test]
    async fn memory_can_be_listed_and_cleared() {
        let state = test_state();
        state.memory.record("earlier prompt", "earlier answer").await;

        let app = crate::build_router(state.clone());
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/memory").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let memory: MemoryResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(memory.store, "rolling");
        assert_eq!(memory.count, 2);
        assert_eq!(memory.entries[0], Message::user("earlier prompt"));
        assert_eq!(memory.entries[1], Message::assistant("earlier answer"));

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/memory")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.memory.is_empty().await);
    }

    #[tokio::test]
    async fn health_reports_version() {
        let app = crate::build_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }
}
