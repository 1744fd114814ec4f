//! HTTP handlers for the analysis API

use super::server::AppState;
use crate::analysis::AnalysisMode;
use crate::error::Error;
use crate::graph::ArgumentGraph;
use crate::pipeline::Session;
use crate::render::{render_all, Diagrams, FlowDirection, RenderOptions, TimelineColoring};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// Request for analysing conversation text
#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    /// Overrides the configured pass; omitted means the server's setting
    #[serde(default)]
    pub mode: Option<AnalysisMode>,
    pub timeline: TimelineColoring,
    #[serde(default)]
    pub flow_direction: Option<FlowDirection>,
}

/// Request for rendering an already analysed graph
#[derive(Deserialize)]
pub struct RenderRequest {
    pub graph: ArgumentGraph,
    pub timeline: TimelineColoring,
    #[serde(default)]
    pub flow_direction: Option<FlowDirection>,
}

/// Session plus its diagrams
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub session: Session,
    pub diagrams: Diagrams,
}

/// Pipeline error rendered as a JSON body
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::ExtractionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::EmbeddingFailed(_) => StatusCode::BAD_GATEWAY,
            Error::Graph(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!("Request failed: {}", self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Handler for text analysis
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let analysis = &state.config.analysis;
    let mode = payload
        .mode
        .or_else(|| analysis.topic_analysis.then_some(analysis.mode));

    let session = state.pipeline.run_with_mode(&payload.text, mode).await?;
    let options = RenderOptions {
        timeline: payload.timeline,
        flow_direction: payload.flow_direction.unwrap_or(analysis.flow_direction),
    };
    let diagrams = session.render(&options);

    Ok(Json(AnalyzeResponse { session, diagrams }))
}

/// Handler for rendering a client-supplied graph
pub async fn render_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RenderRequest>,
) -> Json<Diagrams> {
    let options = RenderOptions {
        timeline: payload.timeline,
        flow_direction: payload
            .flow_direction
            .unwrap_or(state.config.analysis.flow_direction),
    };
    Json(render_all(&payload.graph, &options))
}

/// Handler for system status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = &state.config;
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "llm": {
            "provider": config.llm.provider,
            "model": config.llm.model,
        },
        "embedding": {
            "provider": config.embedding.provider,
            "model": config.embedding.model,
        },
        "analysis": config.analysis,
    }))
}

#[cfg(test)]
mod tests {
    use crate::config::{AppConfig, LLMProvider};
    use crate::http::{router, AppState};
    use crate::pipeline::Pipeline;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let mut config = AppConfig::default();
        config.llm.provider = LLMProvider::Mock;
        config.embedding.provider = LLMProvider::Mock;
        let pipeline = Pipeline::from_config(&config).unwrap();
        router(Arc::new(AppState { pipeline, config }))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_status() {
        let request = Request::builder().uri("/api/status").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["llm"]["provider"], "mock");
    }

    #[tokio::test]
    async fn test_analyze_timeline() {
        let request = post(
            "/api/analyze",
            json!({
                "text": "Alice: Should we refactor?\nBob: Yes, start with the parser.\nCarol: However it is risky.",
                "mode": "timeline",
                "timeline": {"metric": "similarity", "mode": "sequential"},
            }),
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["mode"], "timeline");
        assert!(body["diagrams"]["timeline"].is_object());
        assert!(body["diagrams"]["topic_map"].is_null());
        assert!(body["diagrams"]["flow"].as_str().unwrap().starts_with("graph TD"));
    }

    #[tokio::test]
    async fn test_analyze_empty_text() {
        let request = post(
            "/api/analyze",
            json!({"text": "", "timeline": {"metric": "distance", "mode": "reference_point"}}),
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("Extraction failed"));
    }

    #[tokio::test]
    async fn test_render_requires_timeline_coloring() {
        let request = post("/api/render", json!({"graph": {"nodes": [], "edges": []}}));
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_render_graph() {
        let request = post(
            "/api/render",
            json!({
                "graph": {"nodes": [{"id": "n1", "type": "issue", "content": "Why?"}], "edges": []},
                "timeline": {"metric": "similarity", "mode": "reference_point"},
                "flow_direction": "LR",
            }),
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["flow"].as_str().unwrap().starts_with("graph LR"));
    }
}
