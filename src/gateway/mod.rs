//! HTTP gateway (Axum) for document upload and chunk explanation.
//!
//! This module is primarily used by the `polarity` server binary.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{explain_chunk_handler, upload_text_handler};
pub use state::HandlerState;

pub const POLARITY_STATUS_HEADER: &str = "x-polarity-status";
pub const POLARITY_STATUS_HEALTHY: &str = "healthy";
pub const POLARITY_STATUS_READY: &str = "ready";
pub const POLARITY_STATUS_ANALYZED: &str = "analyzed";
pub const POLARITY_STATUS_NO_CONTENT: &str = "no_content";
pub const POLARITY_STATUS_EXPLAINED: &str = "explained";

pub fn create_router_with_state(state: HandlerState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/upload-text", post(upload_text_handler))
        .route("/explain-chunk", post(explain_chunk_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub model: &'static str,
    pub model_mode: &'static str,
    pub tokenizer_family: &'static str,
    pub sessions: u64,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        POLARITY_STATUS_HEADER,
        HeaderValue::from_static(POLARITY_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    let model_mode = if state.analyzer.is_stub() {
        "stub"
    } else {
        "real"
    };

    let components = ComponentStatus {
        http: POLARITY_STATUS_READY,
        model: POLARITY_STATUS_READY,
        model_mode,
        tokenizer_family: state.analyzer.model().tokenizer_family().as_str(),
        sessions: state.sessions.len(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        POLARITY_STATUS_HEADER,
        HeaderValue::from_static(POLARITY_STATUS_READY),
    );

    (
        StatusCode::OK,
        headers,
        Json(ReadyResponse {
            status: "ok",
            components,
        }),
    )
        .into_response()
}
