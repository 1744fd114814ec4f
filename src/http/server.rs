//! HTTP server for the analysis API and the viewer page

use super::handler::{analyze_handler, render_handler, status_handler};
use crate::config::{AppConfig, ServerConfig};
use crate::pipeline::Pipeline;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use rust_embed::RustEmbed;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

#[derive(RustEmbed)]
#[folder = "src/http/static/"]
struct Assets;

async fn static_handler() -> impl IntoResponse {
    match Assets::get("index.html") {
        Some(file) => Html(String::from_utf8_lossy(file.data.as_ref()).into_owned()).into_response(),
        None => (StatusCode::NOT_FOUND, "viewer page not bundled").into_response(),
    }
}

/// Shared handler state
pub struct AppState {
    pub pipeline: Pipeline,
    pub config: AppConfig,
}

/// Build the API router around a pipeline
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(static_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/render", post(render_handler))
        .route("/api/status", get(status_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP server managing the analysis API and static assets
pub struct HttpServer {
    state: Arc<AppState>,
    server: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(pipeline: Pipeline, config: AppConfig) -> Self {
        let server = config.server.clone();
        Self {
            state: Arc::new(AppState { pipeline, config }),
            server,
        }
    }

    /// Start the HTTP server
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = router(Arc::clone(&self.state));

        let addr = format!("{}:{}", self.server.address, self.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("Viewer available at http://{}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
