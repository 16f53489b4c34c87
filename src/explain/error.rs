use thiserror::Error;

use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("model call failed during explanation: {0}")]
    Model(#[from] ModelError),

    #[error("attribution engine failed: {reason}")]
    AttributionFailed { reason: String },

    #[error("attribution engine returned {actual} results for {expected} texts")]
    ResultCountMismatch { expected: usize, actual: usize },
}
