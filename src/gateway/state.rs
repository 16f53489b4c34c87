use std::sync::Arc;

use crate::analyzer::SentimentAnalyzer;
use crate::constants::DEFAULT_MAX_UPLOAD_BYTES;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct HandlerState {
    pub analyzer: Arc<SentimentAnalyzer>,

    pub sessions: SessionStore,

    pub max_upload_bytes: usize,
}

impl HandlerState {
    pub fn new(analyzer: Arc<SentimentAnalyzer>, sessions: SessionStore) -> Self {
        Self {
            analyzer,
            sessions,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
