use tracing::debug;

use super::error::PipelineError;
use super::types::{Probabilities, ProbabilityMatrix};
use crate::model::{ModelError, SentimentModel};

/// Softmax probabilities for a single text.
///
/// Truncation to the model's input limit happens inside the adapter. NaN or infinite
/// outputs are rejected with [`ModelError::NonFiniteOutput`].
pub fn predict_one(model: &dyn SentimentModel, text: &str) -> Result<Probabilities, ModelError> {
    let probabilities = Probabilities::from_logits(model.predict_raw(text)?);
    if probabilities.as_array().iter().any(|p| !p.is_finite()) {
        return Err(ModelError::NonFiniteOutput);
    }
    Ok(probabilities)
}

/// Probability matrix for `texts`, one row per input in input order.
///
/// Items run one at a time; the first failure aborts the whole batch.
pub fn predict<S: AsRef<str>>(
    model: &dyn SentimentModel,
    texts: &[S],
) -> Result<ProbabilityMatrix, PipelineError> {
    let rows = texts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            predict_one(model, text.as_ref()).map_err(|source| match source {
                ModelError::NonFiniteOutput => PipelineError::NonFiniteOutput { index },
                source => PipelineError::Prediction { index, source },
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    debug!(rows = rows.len(), "Predicted chunk probabilities");

    Ok(ProbabilityMatrix::new(rows))
}
