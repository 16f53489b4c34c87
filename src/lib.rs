//! Polarity library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`chunk`], [`predict`], [`aggregate`], [`summarize`] - Upload path
//! - [`Probabilities`], [`Label`], [`ProbabilityMatrix`] - Three-class outputs
//!
//! ## Explanation
//! - [`Attributor`] - Per-word contributions for one chunk
//! - [`AttributionEngineFactory`], [`OcclusionEngineFactory`] - Pluggable attribution
//! - [`SubwordMerge`] - Tokenizer-family merge rules
//!
//! ## Model
//! - [`SentimentModel`] - Tokenizer and classifier adapter
//! - [`TransformerModel`] - Candle RoBERTa/BERT classifier
//! - [`LexiconModel`] - Word-list stub used when no model is configured
//!
//! ## Service
//! - [`SentimentAnalyzer`] - Both request paths over one model
//! - [`SessionStore`] - Uploaded chunks kept for later explanation
//! - [`Config`], [`ConfigError`] - Server configuration
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod analyzer;
pub mod config;
pub mod constants;
pub mod explain;
pub mod gateway;
pub mod model;
pub mod pipeline;
pub mod session;

pub use analyzer::{AnalysisOutcome, AnalyzerConfig, DocumentAnalysis, SentimentAnalyzer};
pub use config::{Config, ConfigError};
pub use constants::{LABELS, NUM_LABELS};
pub use explain::{
    AttributionEngine, AttributionEngineFactory, Attributor, ChunkExplanation, ExplainError,
    OcclusionEngineFactory, SubwordMerge, WordContribution,
};
pub use gateway::{
    GatewayError, HandlerState, POLARITY_STATUS_HEADER, POLARITY_STATUS_HEALTHY,
    POLARITY_STATUS_READY, create_router_with_state,
};
#[cfg(any(test, feature = "mock"))]
pub use model::MockSentimentModel;
pub use model::{
    LexiconModel, ModelConfig, ModelError, SentimentModel, TokenizerFamily, TransformerModel,
    load_model,
};
pub use pipeline::{
    Aggregation, Chunk, ChunkSummary, DocumentVerdict, Label, PipelineError, Probabilities,
    ProbabilityMatrix, aggregate, chunk, predict, summarize,
};
pub use session::SessionStore;
