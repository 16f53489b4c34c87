//! Cross-cutting, shared constants.
//!
//! # Label Order
//!
//! Probability vectors are indexed positionally everywhere in the crate. The order
//! below is an invariant shared by the model adapter, the predictor, the aggregator
//! and the attributor; [`crate::pipeline::Label`] is derived from it.

/// Label names in probability-vector order.
pub const LABELS: [&str; 3] = ["negative", "neutral", "positive"];

/// Number of output classes of the sentiment model.
pub const NUM_LABELS: usize = LABELS.len();

/// Maximum number of tokens (special tokens included) the classifier accepts.
pub const MODEL_MAX_SEQ_LEN: usize = 512;

/// Default chunk window, leaving headroom under [`MODEL_MAX_SEQ_LEN`] for special
/// tokens and re-tokenization drift after decoding.
pub const DEFAULT_MAX_TOKENS_PER_CHUNK: usize = 450;

/// Default number of chunk summaries returned for an upload.
pub const DEFAULT_TOP_N: usize = 20;

/// Default number of word contributions returned for an explanation.
pub const DEFAULT_TOP_K: usize = 15;

/// Characters kept in a chunk preview.
pub const PREVIEW_CHARS: usize = 160;

/// Appended to a preview that was cut short.
pub const PREVIEW_TRUNCATION_MARKER: &str = "…";

/// Distinct pieces the lexicon stub keeps decodable.
pub const DEFAULT_LEXICON_PIECE_CAPACITY: u64 = 65_536;

pub const DEFAULT_SESSION_CAPACITY: u64 = 10_000;

pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Masked variants predicted per batch by the occlusion engine.
pub const DEFAULT_EXPLAIN_BATCH_SIZE: usize = 16;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Tolerance used when checking that a probability vector sums to one.
pub const PROBABILITY_SUM_TOLERANCE: f32 = 1e-4;
