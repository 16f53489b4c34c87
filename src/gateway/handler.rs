use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartError, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument};

use super::{
    POLARITY_STATUS_ANALYZED, POLARITY_STATUS_EXPLAINED, POLARITY_STATUS_HEADER,
    POLARITY_STATUS_NO_CONTENT,
};
use crate::analyzer::AnalysisOutcome;
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{ExplainRequest, ExplainResponse, UploadQuery, UploadResponse};
use crate::gateway::state::HandlerState;

/// Multipart field carrying the uploaded document.
pub const UPLOAD_FIELD: &str = "file";

#[instrument(skip(state, query, multipart), fields(bytes = tracing::field::Empty))]
pub async fn upload_text_handler(
    State(state): State<HandlerState>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    multipart: Multipart,
) -> Result<Response, GatewayError> {
    let Query(query) =
        query.map_err(|e| GatewayError::InvalidRequest(format!("Invalid query: {}", e)))?;

    let text = read_upload(multipart, state.max_upload_bytes).await?;
    tracing::Span::current().record("bytes", text.len());

    let analyzer = Arc::clone(&state.analyzer);
    let top_n = query.top_n;
    let outcome = tokio::task::spawn_blocking(move || analyzer.analyze(&text, top_n))
        .await
        .map_err(|e| GatewayError::InternalError(format!("analysis task failed: {}", e)))??;

    let (status, body) = match outcome {
        AnalysisOutcome::NoContent => {
            debug!("Upload held no text");
            (POLARITY_STATUS_NO_CONTENT, UploadResponse::no_content())
        }
        AnalysisOutcome::Analyzed(analysis) => {
            let chunk_count = analysis.chunks.len();
            let session_id = state.sessions.create(analysis.chunks);
            info!(
                session_id = %session_id,
                chunks = chunk_count,
                predicted_label = %analysis.verdict.predicted_label,
                "Document analyzed"
            );
            (
                POLARITY_STATUS_ANALYZED,
                UploadResponse::analyzed(session_id, analysis.verdict, analysis.summaries),
            )
        }
    };

    Ok(with_status(status, Json(body)))
}

#[instrument(skip(state, request))]
pub async fn explain_chunk_handler(
    State(state): State<HandlerState>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let request: ExplainRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;

    let chunks = state.sessions.get(&request.session_id).ok_or_else(|| {
        GatewayError::UnknownSession {
            session_id: request.session_id.clone(),
        }
    })?;

    let chunk_id = usize::try_from(request.chunk_id)
        .ok()
        .filter(|&index| index < chunks.len())
        .ok_or(GatewayError::InvalidChunk {
            chunk_id: request.chunk_id,
            num_chunks: chunks.len(),
        })?;

    let text = chunks[chunk_id].text.clone();
    let analyzer = Arc::clone(&state.analyzer);
    let top_k = request.top_contribution_words;
    let explanation = tokio::task::spawn_blocking(move || analyzer.explain(&text, top_k))
        .await
        .map_err(|e| GatewayError::InternalError(format!("explain task failed: {}", e)))??;

    info!(
        session_id = %request.session_id,
        chunk_id,
        predicted_label = %explanation.predicted_label,
        words = explanation.top_word_contributions.len(),
        "Chunk explained"
    );

    Ok(with_status(
        POLARITY_STATUS_EXPLAINED,
        Json(ExplainResponse {
            chunk_id,
            explanation,
        }),
    ))
}

/// Reads the `file` field and decodes it as UTF-8, replacing invalid sequences.
async fn read_upload(mut multipart: Multipart, limit: usize) -> Result<String, GatewayError> {
    let multipart_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge { limit }
        } else {
            GatewayError::InvalidRequest(format!("Invalid multipart body: {}", e))
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }

    Err(GatewayError::InvalidRequest(format!(
        "missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}

fn with_status(status: &'static str, body: impl IntoResponse) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(POLARITY_STATUS_HEADER, HeaderValue::from_static(status));
    (StatusCode::OK, headers, body).into_response()
}
