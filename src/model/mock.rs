use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::error::ModelError;
use super::family::TokenizerFamily;
use super::lexicon::LexiconModel;
use super::{SentimentModel, TokenPiece};
use crate::constants::NUM_LABELS;

/// Test double wrapping [`LexiconModel`] with scripted logits, failure injection
/// and a prediction counter.
#[derive(Debug, Default)]
pub struct MockSentimentModel {
    inner: LexiconModel,
    scripted: RwLock<HashMap<String, [f32; NUM_LABELS]>>,
    fail_after: Option<usize>,
    predictions: AtomicUsize,
}

impl MockSentimentModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every prediction fails.
    pub fn failing() -> Self {
        Self::failing_after(0)
    }

    /// The first `n` predictions succeed, the rest fail.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    /// Returns `logits` for any text whose trimmed form equals `text`.
    pub fn with_logits(self, text: &str, logits: [f32; NUM_LABELS]) -> Self {
        self.scripted.write().insert(text.trim().to_string(), logits);
        self
    }

    pub fn prediction_count(&self) -> usize {
        self.predictions.load(Ordering::SeqCst)
    }
}

impl SentimentModel for MockSentimentModel {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ModelError> {
        self.inner.encode(text)
    }

    fn decode(&self, ids: &[u32]) -> Result<String, ModelError> {
        self.inner.decode(ids)
    }

    fn tokenize(&self, text: &str) -> Result<Vec<TokenPiece>, ModelError> {
        self.inner.tokenize(text)
    }

    fn predict_raw(&self, text: &str) -> Result<[f32; NUM_LABELS], ModelError> {
        let call = self.predictions.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|n| call >= n) {
            return Err(ModelError::InferenceFailed {
                reason: format!("mock failure on prediction {call}"),
            });
        }

        if let Some(logits) = self.scripted.read().get(text.trim()) {
            return Ok(*logits);
        }

        self.inner.predict_raw(text)
    }

    fn mask_token_id(&self) -> Option<u32> {
        None
    }

    fn tokenizer_family(&self) -> TokenizerFamily {
        TokenizerFamily::ByteLevelBpe
    }

    fn is_stub(&self) -> bool {
        true
    }
}
