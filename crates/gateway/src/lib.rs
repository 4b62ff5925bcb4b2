//! HTTP gateway for Council.
//!
//! Serves the embedded web UI, the streaming `/api/run` endpoint, a JSON
//! variant of it, and a small memory inspection API.
//!
//! Built on Axum.

pub mod api;
pub mod frontend;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use council_agent::AgentPipeline;
use council_config::AppConfig;
use council_core::error::Error;
use council_core::memory::ConversationStore;
use council_memory::{NoopMemory, RollingMemory};

/// Request bodies above this size are rejected.
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub pipeline: Arc<AgentPipeline>,
    pub memory: Arc<dyn ConversationStore>,
    pub config: AppConfig,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    /// Assemble the completion client, memory store and pipeline from config.
    ///
    /// The config is validated first; a rejected config surfaces as
    /// [`Error::Config`].
    pub fn from_config(config: AppConfig) -> Result<Self, Error> {
        config.validate().map_err(|e| Error::Config {
            message: e.to_string(),
        })?;
        let client = council_providers::build_from_config(&config)?;
        let memory = build_memory(&config);
        let pipeline = AgentPipeline::from_config(client, memory.clone(), &config);
        Ok(Self::new(pipeline, config))
    }

    /// Wrap an already-built pipeline; the pipeline's store doubles as the
    /// store behind `/api/memory`.
    pub fn new(pipeline: AgentPipeline, config: AppConfig) -> Self {
        let memory = pipeline.memory().clone();
        Self {
            pipeline: Arc::new(pipeline),
            memory,
            config,
        }
    }
}

/// The configured conversation store: a rolling window, or nothing at all.
pub fn build_memory(config: &AppConfig) -> Arc<dyn ConversationStore> {
    if config.memory.enabled {
        Arc::new(RollingMemory::with_capacity(config.memory.capacity))
    } else {
        info!("Conversation memory disabled");
        Arc::new(NoopMemory)
    }
}

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS limited to the gateway's own origin
/// - Request body size limit
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(api::api_router())
        .with_state(state)
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origin = format!("http://{}:{}", config.gateway.host, config.gateway.port);
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    match HeaderValue::from_str(&origin) {
        Ok(value) => layer.allow_origin(value),
        Err(e) => {
            warn!(origin = %origin, error = %e, "Invalid CORS origin, allowing same-origin only");
            layer
        }
    }
}

/// Start the gateway HTTP server and serve until Ctrl-C.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(GatewayState::from_config(config)?);

    info!(
        addr = %addr,
        provider = %state.config.provider.name,
        model = %state.config.provider.model,
        agents = state.pipeline.agents().len(),
        memory = %state.memory.name(),
        "Gateway starting"
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_support::test_state());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn index_is_served_alongside_api() {
        let app = build_router(test_support::test_state());

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn from_config_requires_api_key() {
        let err = GatewayState::from_config(AppConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[test]
    fn from_config_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.api_key = Some("fw-test".into());
        config.memory.capacity = 0;

        let err = GatewayState::from_config(config).err().unwrap();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("memory.capacity"));
    }

    #[test]
    fn from_config_builds_pipeline() {
        let mut config = AppConfig::default();
        config.api_key = Some("fw-test".into());
        let state = GatewayState::from_config(config).unwrap();
        assert_eq!(state.pipeline.agents().len(), 3);
        assert_eq!(state.memory.name(), "rolling");
    }

    #[test]
    fn disabled_memory_is_noop() {
        let mut config = AppConfig::default();
        config.memory.enabled = false;
        assert_eq!(build_memory(&config).name(), "none");
    }
}
