//! Embedded web UI.
//!
//! `frontend/` is compiled into the binary with `include_str!`, so a single
//! executable serves both the API and the page that drives it.

use axum::{
    Router,
    extract::Path,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};

const INDEX_HTML: &str = include_str!("../../../frontend/index.html");

/// Static assets served under `/static/{name}`: (name, content type, body).
const ASSETS: &[(&str, &str, &str)] = &[
    (
        "style.css",
        "text/css; charset=utf-8",
        include_str!("../../../frontend/style.css"),
    ),
    (
        "app.js",
        "application/javascript; charset=utf-8",
        include_str!("../../../frontend/app.js"),
    ),
];

/// Build a router that serves the embedded page and its assets.
pub fn frontend_router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/static/{name}", get(asset_handler))
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn asset_handler(Path(name): Path<String>) -> Response {
    match ASSETS.iter().find(|(asset, _, _)| *asset == name) {
        Some((_, content_type, body)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, *content_type),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            *body,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn get(uri: &str) -> Response {
        frontend_router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn text(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8_lossy(&body).into_owned()
    }

    #[tokio::test]
    async fn serves_index_html() {
        let response = get("/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = text(response).await;
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("/static/app.js"));
        assert!(html.contains("/static/style.css"));
    }

    #[tokio::test]
    async fn serves_css() {
        let response = get("/static/style.css").await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.contains("text/css"));
    }

    #[tokio::test]
    async fn serves_js_that_reads_the_run_stream() {
        let response = get("/static/app.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.contains("javascript"));

        let js = text(response).await;
        assert!(js.contains("/api/run"));
        assert!(js.contains("--- Final Answer ---"));
    }

    #[tokio::test]
    async fn unknown_asset_is_not_found() {
        assert_eq!(get("/static/missing.js").await.status(), StatusCode::NOT_FOUND);
    }
}
