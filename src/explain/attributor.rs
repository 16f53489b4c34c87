use std::sync::{Arc, OnceLock};

use tracing::{debug, info};

use super::engine::{AttributionEngine, AttributionEngineFactory, PredictFn};
use super::error::ExplainError;
use super::merge::{SubwordMerge, merger_for, rank_contributions};
use super::types::ChunkExplanation;
use crate::constants::LABELS;
use crate::model::{ModelError, SentimentModel};
use crate::pipeline::{Probabilities, predict_one};

/// Explains single-chunk predictions as ranked word contributions.
///
/// The attribution engine is built on first use and shared by every later call.
pub struct Attributor {
    model: Arc<dyn SentimentModel>,
    factory: Box<dyn AttributionEngineFactory>,
    engine: OnceLock<Box<dyn AttributionEngine>>,
    merger: Box<dyn SubwordMerge>,
}

impl std::fmt::Debug for Attributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attributor")
            .field("tokenizer_family", &self.model.tokenizer_family())
            .field("engine_built", &self.is_engine_built())
            .finish()
    }
}

impl Attributor {
    /// Uses the merge rule for the model's tokenizer family.
    pub fn new(model: Arc<dyn SentimentModel>, factory: Box<dyn AttributionEngineFactory>) -> Self {
        let merger = merger_for(model.tokenizer_family());
        Self::with_merger(model, factory, merger)
    }

    pub fn with_merger(
        model: Arc<dyn SentimentModel>,
        factory: Box<dyn AttributionEngineFactory>,
        merger: Box<dyn SubwordMerge>,
    ) -> Self {
        Self {
            model,
            factory,
            engine: OnceLock::new(),
            merger,
        }
    }

    pub fn is_engine_built(&self) -> bool {
        self.engine.get().is_some()
    }

    fn engine(&self) -> &dyn AttributionEngine {
        let engine = self.engine.get_or_init(|| {
            info!("Building attribution engine");
            let model = Arc::clone(&self.model);
            let predict: PredictFn = Arc::new(
                move |texts: &[String]| -> Result<Vec<Probabilities>, ModelError> {
                    texts
                        .iter()
                        .map(|text| predict_one(model.as_ref(), text))
                        .collect()
                },
            );
            self.factory.build(predict, LABELS)
        });
        engine.as_ref()
    }

    /// Predicts `text`, attributes the predicted label to its tokens, merges tokens
    /// into words and returns the `top_k` words by absolute contribution.
    pub fn explain(&self, text: &str, top_k: usize) -> Result<ChunkExplanation, ExplainError> {
        let probabilities = predict_one(self.model.as_ref(), text)?;
        let predicted_label = probabilities.predicted();

        let attribution = self
            .engine()
            .explain(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or(ExplainError::ResultCountMismatch {
                expected: 1,
                actual: 0,
            })?;

        let scores = attribution.scores_for(predicted_label);
        let merged = self.merger.merge(&attribution.tokens, &scores);
        let words = merged.len();
        let top_word_contributions = rank_contributions(merged, top_k);

        debug!(
            predicted_label = %predicted_label,
            tokens = attribution.tokens.len(),
            words,
            returned = top_word_contributions.len(),
            "Explained chunk"
        );

        Ok(ChunkExplanation {
            predicted_label,
            probabilities,
            top_word_contributions,
        })
    }
}
