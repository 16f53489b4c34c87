use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::POLARITY_STATUS_HEADER;
use crate::explain::ExplainError;
use crate::pipeline::PipelineError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("unknown session: {session_id}")]
    UnknownSession { session_id: String },

    #[error("invalid chunk_id {chunk_id}: session has {num_chunks} chunks")]
    InvalidChunk { chunk_id: i64, num_chunks: usize },

    #[error("analysis failed: {0}")]
    AnalysisFailed(#[from] PipelineError),

    #[error("explanation failed: {0}")]
    ExplainFailed(#[from] ExplainError),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) | GatewayError::InvalidChunk { .. } => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::UnknownSession { .. } => StatusCode::NOT_FOUND,
            GatewayError::AnalysisFailed(_)
            | GatewayError::ExplainFailed(_)
            | GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the status header for this error.
    pub fn status_label(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::PayloadTooLarge { .. } => "payload_too_large",
            GatewayError::UnknownSession { .. } => "unknown_session",
            GatewayError::InvalidChunk { .. } => "invalid_chunk",
            GatewayError::AnalysisFailed(_) => "analysis_error",
            GatewayError::ExplainFailed(_) => "explain_error",
            GatewayError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            POLARITY_STATUS_HEADER,
            HeaderValue::from_static(self.status_label()),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
