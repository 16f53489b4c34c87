use std::cmp::Ordering;

use tracing::debug;

use super::error::PipelineError;
use super::types::{Aggregation, Chunk, ChunkSummary, DocumentVerdict, ProbabilityMatrix};
use crate::constants::{PREVIEW_CHARS, PREVIEW_TRUNCATION_MARKER};

/// Reduces per-chunk probabilities to a document verdict and a chunk ranking.
pub fn aggregate(matrix: &ProbabilityMatrix) -> Result<Aggregation, PipelineError> {
    let probabilities = matrix.mean().ok_or(PipelineError::EmptyMatrix)?;
    let predicted_label = probabilities.predicted();

    let mut ranking: Vec<usize> = (0..matrix.len()).collect();
    // `sort_by` is stable: equal scores keep chunk order.
    ranking.sort_by(|&a, &b| {
        let pa = matrix.rows()[a].get(predicted_label);
        let pb = matrix.rows()[b].get(predicted_label);
        pb.partial_cmp(&pa).unwrap_or(Ordering::Equal)
    });

    debug!(
        chunks = matrix.len(),
        predicted_label = %predicted_label,
        top_chunk = ranking.first().copied(),
        "Aggregated document verdict"
    );

    Ok(Aggregation {
        verdict: DocumentVerdict {
            predicted_label,
            probabilities,
            chunk_count: matrix.len(),
        },
        ranking,
    })
}

/// Summaries for the first `top_n` ranked chunks (clamped to what exists).
pub fn summarize(
    chunks: &[Chunk],
    matrix: &ProbabilityMatrix,
    ranking: &[usize],
    top_n: usize,
) -> Vec<ChunkSummary> {
    ranking
        .iter()
        .take(top_n)
        .filter_map(|&index| {
            let chunk = chunks.get(index)?;
            let probabilities = *matrix.row(index)?;
            Some(ChunkSummary {
                chunk_index: index,
                preview: preview(&chunk.text),
                predicted_label: probabilities.predicted(),
                probabilities,
            })
        })
        .collect()
}

/// Trimmed single-line preview, cut at [`PREVIEW_CHARS`] characters.
pub fn preview(text: &str) -> String {
    let flattened = text.trim().replace('\n', " ");
    let mut chars = flattened.chars();
    let mut out: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        out.push_str(PREVIEW_TRUNCATION_MARKER);
    }
    out
}
