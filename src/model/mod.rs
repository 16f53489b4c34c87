//! Sentiment model adapter.
//!
//! Everything downstream talks to the classifier through [`SentimentModel`]: token
//! ids in and out, raw logits per text. Two implementations ship with the crate:
//!
//! - [`TransformerModel`] runs a RoBERTa or BERT sequence classifier with candle.
//! - [`LexiconModel`] is a deterministic word-list stand-in used when no model
//!   directory is configured, and in tests.
//!
//! Build one with [`load_model`] and hand it to [`crate::SentimentAnalyzer`].

/// Sequence-classification heads over candle encoders.
pub mod classifier;
mod config;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
mod family;
mod lexicon;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod transformer;
/// Tokenizer and `config.json` loading helpers.
pub mod utils;


use std::sync::Arc;

use tracing::warn;

pub use config::ModelConfig;
pub use device::DevicePreference;
pub use error::ModelError;
pub use family::TokenizerFamily;
pub use lexicon::LexiconModel;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockSentimentModel;
pub use transformer::TransformerModel;

use crate::constants::{MODEL_MAX_SEQ_LEN, NUM_LABELS};

/// One token of a model input, as the classifier sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPiece {
    pub id: u32,
    /// Surface form from the vocabulary (e.g. `Ġgood`, `##ing`, `<s>`).
    pub text: String,
    /// `true` for sequence markers added by the tokenizer (`<s>`, `[CLS]`, ...).
    pub special: bool,
}

/// Tokenizer plus sequence classifier with exactly [`NUM_LABELS`] outputs in
/// [`crate::constants::LABELS`] order.
pub trait SentimentModel: Send + Sync {
    /// Token ids for `text`, without special tokens and without truncation.
    fn encode(&self, text: &str) -> Result<Vec<u32>, ModelError>;

    /// Text for `ids`. Special tokens present in `ids` are kept.
    fn decode(&self, ids: &[u32]) -> Result<String, ModelError>;

    /// The exact token sequence a prediction on `text` consumes: special tokens
    /// included, truncated to [`SentimentModel::max_input_tokens`].
    fn tokenize(&self, text: &str) -> Result<Vec<TokenPiece>, ModelError>;

    /// Pre-softmax scores for `text`, truncated like [`SentimentModel::tokenize`].
    fn predict_raw(&self, text: &str) -> Result<[f32; NUM_LABELS], ModelError>;

    /// Id substituted for occluded tokens, if the vocabulary has a mask token.
    fn mask_token_id(&self) -> Option<u32>;

    fn tokenizer_family(&self) -> TokenizerFamily;

    fn max_input_tokens(&self) -> usize {
        MODEL_MAX_SEQ_LEN
    }

    /// `true` when no real classifier weights are loaded.
    fn is_stub(&self) -> bool {
        false
    }
}

/// Loads the classifier described by `config`, or the lexicon stub when it has no
/// model path.
pub fn load_model(config: &ModelConfig) -> Result<Arc<dyn SentimentModel>, ModelError> {
    if config.is_stub() {
        warn!("No model path configured, running sentiment classifier in stub mode");
        return Ok(Arc::new(LexiconModel::with_max_seq_len(config.max_seq_len)));
    }

    Ok(Arc::new(TransformerModel::load(config.clone())?))
}
