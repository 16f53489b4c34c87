use serde::{Serialize, Serializer};

use crate::constants::NUM_LABELS;
use crate::pipeline::{Label, Probabilities};

/// A reconstructed whole word and its summed contribution score.
#[derive(Debug, Clone, PartialEq)]
pub struct WordContribution {
    pub word: String,
    /// Positive pushes toward the explained label, negative away from it.
    pub score: f32,
}

impl WordContribution {
    pub fn new(word: impl Into<String>, score: f32) -> Self {
        Self {
            word: word.into(),
            score,
        }
    }
}

/// Serialized as a `[word, score]` pair.
impl Serialize for WordContribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.word, self.score).serialize(serializer)
    }
}

impl<W: Into<String>> From<(W, f32)> for WordContribution {
    fn from((word, score): (W, f32)) -> Self {
        Self::new(word, score)
    }
}

/// Per-token contribution to every label for one explained text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenAttribution {
    /// Token surface forms, special tokens included.
    pub tokens: Vec<String>,
    /// `values[i][label]` is token `i`'s contribution to `label`.
    pub values: Vec<[f32; NUM_LABELS]>,
}

impl TokenAttribution {
    /// Scores for one output dimension, aligned with `tokens`.
    pub fn scores_for(&self, label: Label) -> Vec<f32> {
        self.values.iter().map(|v| v[label.index()]).collect()
    }
}

/// Result of explaining one chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkExplanation {
    pub predicted_label: Label,
    pub probabilities: Probabilities,
    pub top_word_contributions: Vec<WordContribution>,
}
