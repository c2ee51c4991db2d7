// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::detect_objects::{detect_objects_handler, detect_objects_upload_handler};
use super::translate_audio::{translate_audio_handler, translate_audio_upload_handler};
use crate::config::ServerConfig;
use crate::models::ModelRegistry;
use crate::vision::DebugImageWriter;

const OPENAPI_YAML: &str = include_str!("../../docs/openapi.yaml");

const DOCS_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Inference API</title></head>
<body>
<h1>Inference API</h1>
<ul>
<li><code>POST /detect-objects</code> - JSON <code>{"image": "&lt;base64&gt;"}</code></li>
<li><code>POST /detect-objects-upload</code> - multipart form, field <code>file</code></li>
<li><code>POST /translate-audio</code> - JSON <code>{"audio": "&lt;base64 WAV&gt;"}</code></li>
<li><code>POST /translate-audio-upload</code> - multipart form, field <code>file</code></li>
<li><code>GET /health</code></li>
</ul>
<p>Full schema: <a href="/openapi.yaml">openapi.yaml</a></p>
</body>
</html>
"#;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub models: ModelRegistry,
    /// Set when annotated detection images should be written
    pub debug_writer: Option<Arc<DebugImageWriter>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(models: ModelRegistry, config: ServerConfig) -> Self {
        let debug_writer = config
            .save_debug_images
            .then(|| Arc::new(DebugImageWriter::new(config.results_dir.clone())));

        Self {
            models,
            debug_writer,
            config: Arc::new(config),
        }
    }
}

/// Build the router
pub fn create_app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(index_handler))
        .route("/docs", get(docs_handler))
        .route("/openapi.yaml", get(openapi_handler))
        .route("/health", get(health_handler))
        .route("/detect-objects", post(detect_objects_handler))
        .route("/detect-objects-upload", post(detect_objects_upload_handler))
        .route("/translate-audio", post(translate_audio_handler))
        .route("/translate-audio-upload", post(translate_audio_upload_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state.as_ref().clone())
}

/// Bind and serve until Ctrl-C
pub async fn start_server(state: AppState) -> Result<()> {
    let addr = state
        .config
        .bind_addr()
        .await
        .map_err(anyhow::Error::msg)?;

    let app = create_app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// 302 to the docs page
async fn index_handler() -> impl IntoResponse {
    info!("Index page called");
    (StatusCode::FOUND, [(header::LOCATION, "/docs")])
}

async fn docs_handler() -> Html<&'static str> {
    Html(DOCS_HTML)
}

async fn openapi_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/yaml")], OPENAPI_YAML)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let models = state.models.list_models();
    let name_of = |model_type: &str| {
        models
            .iter()
            .find(|m| m.model_type == model_type)
            .map(|m| m.name.clone())
    };

    Json(json!({
        "status": "ok",
        "version": crate::version::get_version_info(),
        "models": {
            "detector": name_of("detector"),
            "translator": name_of("translator"),
        }
    }))
}
