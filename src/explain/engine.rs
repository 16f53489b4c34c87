//! Token attribution engines.
//!
//! An engine is built once from a prediction function and the label names and then
//! reused for every explanation. [`OcclusionEngine`] is the default: it occludes one
//! token at a time and measures how far each label's probability moves.

use std::sync::Arc;

use tracing::debug;

use super::error::ExplainError;
use super::types::TokenAttribution;
use crate::constants::NUM_LABELS;
use crate::model::{ModelError, SentimentModel};
use crate::pipeline::Probabilities;

/// Batch prediction callback handed to attribution engines.
pub type PredictFn =
    Arc<dyn Fn(&[String]) -> Result<Vec<Probabilities>, ModelError> + Send + Sync>;

pub trait AttributionEngine: Send + Sync {
    /// One [`TokenAttribution`] per input text, aligned with
    /// [`SentimentModel::tokenize`] of that text.
    fn explain(&self, texts: &[String]) -> Result<Vec<TokenAttribution>, ExplainError>;
}

pub trait AttributionEngineFactory: Send + Sync {
    fn build(
        &self,
        predict: PredictFn,
        output_names: [&'static str; NUM_LABELS],
    ) -> Box<dyn AttributionEngine>;
}

/// Leave-one-token-out attribution.
///
/// For every non-special token the text is rebuilt with that token replaced by the
/// mask token (or dropped when the vocabulary has none) and predicted again. The
/// token's contribution to a label is `p(text) - p(occluded text)`. Special tokens
/// contribute zero.
pub struct OcclusionEngine {
    model: Arc<dyn SentimentModel>,
    predict: PredictFn,
    output_names: [&'static str; NUM_LABELS],
    batch_size: usize,
}

impl std::fmt::Debug for OcclusionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcclusionEngine")
            .field("output_names", &self.output_names)
            .field("batch_size", &self.batch_size)
            .field("mask_token_id", &self.model.mask_token_id())
            .finish()
    }
}

impl OcclusionEngine {
    fn predict_checked(&self, texts: &[String]) -> Result<Vec<Probabilities>, ExplainError> {
        let predictions = (self.predict)(texts)?;
        if predictions.len() != texts.len() {
            return Err(ExplainError::ResultCountMismatch {
                expected: texts.len(),
                actual: predictions.len(),
            });
        }
        Ok(predictions)
    }

    fn explain_one(&self, text: &str) -> Result<TokenAttribution, ExplainError> {
        let tokens = self.model.tokenize(text)?;
        let base = self.predict_checked(&[text.to_string()])?[0];

        let content: Vec<(usize, u32)> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.special)
            .map(|(pos, t)| (pos, t.id))
            .collect();

        let mask = self.model.mask_token_id();
        let variants = content
            .iter()
            .enumerate()
            .map(|(occluded, _)| {
                let ids: Vec<u32> = content
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &(_, id))| match (i == occluded, mask) {
                        (false, _) => Some(id),
                        (true, Some(mask)) => Some(mask),
                        (true, None) => None,
                    })
                    .collect();
                self.model.decode(&ids)
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        let mut values = vec![[0.0f32; NUM_LABELS]; tokens.len()];
        let mut done = 0;
        for batch in variants.chunks(self.batch_size) {
            let predictions = self.predict_checked(batch)?;
            for occluded in predictions {
                let (pos, _) = content[done];
                for (label, value) in values[pos].iter_mut().enumerate() {
                    *value = base.0[label] - occluded.0[label];
                }
                done += 1;
            }
        }

        debug!(
            tokens = tokens.len(),
            occluded = content.len(),
            masked = mask.is_some(),
            "Computed occlusion attribution"
        );

        Ok(TokenAttribution {
            tokens: tokens.into_iter().map(|t| t.text).collect(),
            values,
        })
    }
}

impl AttributionEngine for OcclusionEngine {
    fn explain(&self, texts: &[String]) -> Result<Vec<TokenAttribution>, ExplainError> {
        texts.iter().map(|text| self.explain_one(text)).collect()
    }
}

/// Builds [`OcclusionEngine`]s over a model's tokenizer.
pub struct OcclusionEngineFactory {
    model: Arc<dyn SentimentModel>,
    batch_size: usize,
}

impl OcclusionEngineFactory {
    pub fn new(model: Arc<dyn SentimentModel>, batch_size: usize) -> Self {
        Self {
            model,
            batch_size: batch_size.max(1),
        }
    }
}

impl AttributionEngineFactory for OcclusionEngineFactory {
    fn build(
        &self,
        predict: PredictFn,
        output_names: [&'static str; NUM_LABELS],
    ) -> Box<dyn AttributionEngine> {
        debug!(batch_size = self.batch_size, "Building occlusion engine");
        Box::new(OcclusionEngine {
            model: Arc::clone(&self.model),
            predict,
            output_names,
            batch_size: self.batch_size,
        })
    }
}
