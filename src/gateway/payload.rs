//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TOP_K, DEFAULT_TOP_N};
use crate::explain::ChunkExplanation;
use crate::pipeline::{ChunkSummary, DocumentVerdict};

/// Message returned when an upload holds no tokens.
pub const NO_CONTENT_MESSAGE: &str = "No text found.";

/// Query string of `POST /upload-text`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UploadQuery {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for UploadQuery {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Body of `POST /explain-chunk`.
///
/// `chunk_id` is signed so a negative index is reported as an invalid chunk
/// rather than a malformed body.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplainRequest {
    pub session_id: String,
    pub chunk_id: i64,
    #[serde(default = "default_top_k")]
    pub top_contribution_words: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentVerdict>,
    pub chunks: Vec<ChunkSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl UploadResponse {
    pub fn no_content() -> Self {
        Self {
            session_id: None,
            document: None,
            chunks: Vec::new(),
            message: Some(NO_CONTENT_MESSAGE),
        }
    }

    pub fn analyzed(
        session_id: String,
        document: DocumentVerdict,
        chunks: Vec<ChunkSummary>,
    ) -> Self {
        Self {
            session_id: Some(session_id),
            document: Some(document),
            chunks,
            message: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub chunk_id: usize,
    #[serde(flatten)]
    pub explanation: ChunkExplanation,
}
