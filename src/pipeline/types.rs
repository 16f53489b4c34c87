use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::constants::{LABELS, NUM_LABELS, PROBABILITY_SUM_TOLERANCE};

/// Sentiment class. The discriminant is the column in every probability vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Negative = 0,
    Neutral = 1,
    Positive = 2,
}

impl Label {
    pub const ALL: [Label; NUM_LABELS] = [Label::Negative, Label::Neutral, Label::Positive];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Panics if `index >= NUM_LABELS`.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index]
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        LABELS[self.index()]
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distribution over [`Label`]s, indexed negative / neutral / positive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Probabilities(pub [f32; NUM_LABELS]);

impl Probabilities {
    pub fn new(values: [f32; NUM_LABELS]) -> Self {
        Self(values)
    }

    /// Softmax over raw logits, shifted by the max for stability.
    pub fn from_logits(logits: [f32; NUM_LABELS]) -> Self {
        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps = logits.map(|l| (l - max).exp());
        let sum: f32 = exps.iter().sum();
        Self(exps.map(|e| e / sum))
    }

    #[inline]
    pub fn get(&self, label: Label) -> f32 {
        self.0[label.index()]
    }

    #[inline]
    pub fn as_array(&self) -> &[f32; NUM_LABELS] {
        &self.0
    }

    /// Highest-probability label; ties go to the lowest index.
    pub fn predicted(&self) -> Label {
        let mut best = 0;
        for (idx, &p) in self.0.iter().enumerate().skip(1) {
            if p > self.0[best] {
                best = idx;
            }
        }
        Label::from_index(best)
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Every entry in `[0, 1]` and the total within tolerance of one.
    pub fn is_normalized(&self) -> bool {
        self.0.iter().all(|p| (0.0..=1.0).contains(p))
            && (self.sum() - 1.0).abs() <= PROBABILITY_SUM_TOLERANCE
    }
}

impl Serialize for Probabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Probabilities", NUM_LABELS)?;
        state.serialize_field(LABELS[0], &self.0[0])?;
        state.serialize_field(LABELS[1], &self.0[1])?;
        state.serialize_field(LABELS[2], &self.0[2])?;
        state.end()
    }
}

/// One window of a document, decoded back to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

/// Per-chunk probabilities; row `i` belongs to chunk `i`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbabilityMatrix {
    rows: Vec<Probabilities>,
}

impl ProbabilityMatrix {
    pub fn new(rows: Vec<Probabilities>) -> Self {
        Self { rows }
    }

    pub fn from_arrays<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = [f32; NUM_LABELS]>,
    {
        Self {
            rows: rows.into_iter().map(Probabilities).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn row(&self, index: usize) -> Option<&Probabilities> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[Probabilities] {
        &self.rows
    }

    /// Column-wise arithmetic mean; `None` for an empty matrix.
    pub fn mean(&self) -> Option<Probabilities> {
        if self.rows.is_empty() {
            return None;
        }
        let n = self.rows.len() as f64;
        let mut totals = [0f64; NUM_LABELS];
        for row in &self.rows {
            for (total, &p) in totals.iter_mut().zip(row.as_array()) {
                *total += p as f64;
            }
        }
        Some(Probabilities(totals.map(|t| (t / n) as f32)))
    }
}

/// Document-level result of [`crate::pipeline::aggregate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentVerdict {
    pub predicted_label: Label,
    pub probabilities: Probabilities,
    #[serde(rename = "num_chunks")]
    pub chunk_count: usize,
}

/// Verdict plus chunk indices by descending probability on the predicted label.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub verdict: DocumentVerdict,
    pub ranking: Vec<usize>,
}

/// Human-readable view of one ranked chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkSummary {
    #[serde(rename = "chunk_id")]
    pub chunk_index: usize,
    pub preview: String,
    /// The chunk's own arg-max, independent of the document verdict.
    pub predicted_label: Label,
    pub probabilities: Probabilities,
}
