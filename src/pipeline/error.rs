use thiserror::Error;

use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("chunk size must be at least 1 token")]
    InvalidChunkSize,

    #[error("cannot aggregate an empty probability matrix")]
    EmptyMatrix,

    #[error("chunking failed: {0}")]
    Chunking(#[source] ModelError),

    #[error("prediction failed for chunk {index}: {source}")]
    Prediction {
        index: usize,
        #[source]
        source: ModelError,
    },

    #[error("model returned a non-finite probability for chunk {index}")]
    NonFiniteOutput { index: usize },
}
