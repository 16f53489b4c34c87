//! Upload path: chunk → predict → aggregate.
//!
//! - [`chunk`] cuts a document into token windows the classifier can take whole.
//! - [`predict`] turns chunk texts into a [`ProbabilityMatrix`].
//! - [`aggregate`] averages the matrix into a [`DocumentVerdict`] and ranks chunks
//!   by how strongly they carry that verdict; [`summarize`] renders the top of the
//!   ranking.

mod aggregator;
mod chunker;
mod error;
mod predictor;
mod types;


pub use aggregator::{aggregate, preview, summarize};
pub use chunker::chunk;
pub use error::PipelineError;
pub use predictor::{predict, predict_one};
pub use types::{
    Aggregation, Chunk, ChunkSummary, DocumentVerdict, Label, Probabilities, ProbabilityMatrix,
};
