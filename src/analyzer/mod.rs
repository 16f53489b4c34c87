//! Document analysis facade.
//!
//! [`SentimentAnalyzer`] owns the model adapter and the lazily built attribution
//! engine, and exposes the two request paths: [`SentimentAnalyzer::analyze`] for
//! whole documents and [`SentimentAnalyzer::explain`] for one retained chunk.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::{debug, info};

use crate::constants::{DEFAULT_EXPLAIN_BATCH_SIZE, DEFAULT_MAX_TOKENS_PER_CHUNK};
use crate::explain::{
    AttributionEngineFactory, Attributor, ChunkExplanation, ExplainError, OcclusionEngineFactory,
};
use crate::model::SentimentModel;
use crate::pipeline::{
    Chunk, ChunkSummary, DocumentVerdict, PipelineError, aggregate, chunk, predict, summarize,
};

/// Tunables for [`SentimentAnalyzer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Token window per chunk. Must be at least 1.
    pub max_tokens_per_chunk: usize,
    /// Occlusion variants predicted per batch.
    pub explain_batch_size: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_tokens_per_chunk: DEFAULT_MAX_TOKENS_PER_CHUNK,
            explain_batch_size: DEFAULT_EXPLAIN_BATCH_SIZE,
        }
    }
}

/// Everything the upload path produces for a document with content.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAnalysis {
    pub chunks: Vec<Chunk>,
    pub verdict: DocumentVerdict,
    /// Chunk indices, strongest carrier of the verdict first.
    pub ranking: Vec<usize>,
    pub summaries: Vec<ChunkSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The text encoded to no tokens; nothing was predicted.
    NoContent,
    Analyzed(DocumentAnalysis),
}

pub struct SentimentAnalyzer {
    model: Arc<dyn SentimentModel>,
    config: AnalyzerConfig,
    attributor: Attributor,
}

impl std::fmt::Debug for SentimentAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentAnalyzer")
            .field("config", &self.config)
            .field("stub", &self.model.is_stub())
            .field("attributor", &self.attributor)
            .finish()
    }
}

impl SentimentAnalyzer {
    /// Builds an analyzer that explains with the occlusion engine.
    pub fn new(
        model: Arc<dyn SentimentModel>,
        config: AnalyzerConfig,
    ) -> Result<Self, PipelineError> {
        let factory = OcclusionEngineFactory::new(Arc::clone(&model), config.explain_batch_size);
        Self::with_engine_factory(model, config, Box::new(factory))
    }

    pub fn with_engine_factory(
        model: Arc<dyn SentimentModel>,
        config: AnalyzerConfig,
        factory: Box<dyn AttributionEngineFactory>,
    ) -> Result<Self, PipelineError> {
        if config.max_tokens_per_chunk == 0 {
            return Err(PipelineError::InvalidChunkSize);
        }

        info!(
            max_tokens_per_chunk = config.max_tokens_per_chunk,
            explain_batch_size = config.explain_batch_size,
            tokenizer_family = %model.tokenizer_family(),
            stub = model.is_stub(),
            "Sentiment analyzer ready"
        );

        let attributor = Attributor::new(Arc::clone(&model), factory);
        Ok(Self {
            model,
            config,
            attributor,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn model(&self) -> &Arc<dyn SentimentModel> {
        &self.model
    }

    #[inline]
    pub fn is_stub(&self) -> bool {
        self.model.is_stub()
    }

    /// Chunks, predicts and aggregates `text`, summarizing the `top_n` most
    /// relevant chunks.
    pub fn analyze(&self, text: &str, top_n: usize) -> Result<AnalysisOutcome, PipelineError> {
        let chunks = chunk(self.model.as_ref(), text, self.config.max_tokens_per_chunk)?;
        if chunks.is_empty() {
            debug!(text_len = text.len(), "No content to analyze");
            return Ok(AnalysisOutcome::NoContent);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let matrix = predict(self.model.as_ref(), &texts)?;
        let aggregation = aggregate(&matrix)?;
        let summaries = summarize(&chunks, &matrix, &aggregation.ranking, top_n);

        Ok(AnalysisOutcome::Analyzed(DocumentAnalysis {
            chunks,
            verdict: aggregation.verdict,
            ranking: aggregation.ranking,
            summaries,
        }))
    }

    /// Explains the prediction for one chunk's text, returning its `top_k` words.
    pub fn explain(&self, text: &str, top_k: usize) -> Result<ChunkExplanation, ExplainError> {
        self.attributor.explain(text, top_k)
    }
}
