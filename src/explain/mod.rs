//! Explain path: per-word contributions for one chunk's prediction.
//!
//! [`Attributor`] predicts the chunk, asks an [`AttributionEngine`] for per-token
//! scores on the predicted label, folds sub-word tokens into words with a
//! [`SubwordMerge`] strategy and ranks the words by absolute contribution.

mod attributor;
pub mod engine;
mod error;
pub mod merge;
mod types;


pub use attributor::Attributor;
pub use engine::{
    AttributionEngine, AttributionEngineFactory, OcclusionEngine, OcclusionEngineFactory,
    PredictFn,
};
pub use error::ExplainError;
pub use merge::{
    SubwordMerge, WordPieceMerge, WordStartMarkerMerge, merger_for, rank_contributions,
};
pub use types::{ChunkExplanation, TokenAttribution, WordContribution};
