use tracing::debug;

use super::error::PipelineError;
use super::types::Chunk;
use crate::model::SentimentModel;

/// Splits `text` into consecutive windows of at most `max_tokens_per_chunk` tokens.
///
/// Windows do not overlap and ignore sentence boundaries; the last one may be
/// shorter. Text that encodes to no tokens yields no chunks.
pub fn chunk(
    model: &dyn SentimentModel,
    text: &str,
    max_tokens_per_chunk: usize,
) -> Result<Vec<Chunk>, PipelineError> {
    if max_tokens_per_chunk == 0 {
        return Err(PipelineError::InvalidChunkSize);
    }

    let ids = model.encode(text).map_err(PipelineError::Chunking)?;

    let chunks = ids
        .chunks(max_tokens_per_chunk)
        .enumerate()
        .map(|(index, window)| {
            Ok(Chunk {
                index,
                text: model.decode(window).map_err(PipelineError::Chunking)?,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    debug!(
        text_len = text.len(),
        tokens = ids.len(),
        chunks = chunks.len(),
        max_tokens_per_chunk,
        "Chunked document"
    );

    Ok(chunks)
}
