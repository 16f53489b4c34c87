//! Sub-word → word merge strategies.
//!
//! Attribution scores arrive per tokenizer token. Each [`SubwordMerge`] knows one
//! tokenizer family's boundary convention and folds token scores into whole words
//! by summation, preserving left-to-right order.

use std::cmp::Ordering;

use super::types::WordContribution;
use crate::model::TokenizerFamily;

pub trait SubwordMerge: Send + Sync {
    /// Merges `tokens` and their aligned `scores` into words. Extra entries on
    /// either side are ignored.
    fn merge(&self, tokens: &[String], scores: &[f32]) -> Vec<WordContribution>;
}

/// Families whose tokenizer prefixes the first piece of a word with a marker
/// glyph (`Ġ` for byte-level BPE, `▁` for SentencePiece).
#[derive(Debug, Clone, Copy)]
pub struct WordStartMarkerMerge {
    marker: &'static str,
    boundaries: &'static [&'static str],
}

impl WordStartMarkerMerge {
    pub const BYTE_LEVEL_BPE: Self = Self {
        marker: "Ġ",
        boundaries: &["<s>", "</s>"],
    };

    pub const SENTENCEPIECE: Self = Self {
        marker: "▁",
        boundaries: &["<s>", "</s>"],
    };

    pub fn new(marker: &'static str, boundaries: &'static [&'static str]) -> Self {
        Self { marker, boundaries }
    }
}

impl SubwordMerge for WordStartMarkerMerge {
    fn merge(&self, tokens: &[String], scores: &[f32]) -> Vec<WordContribution> {
        let mut merged = Vec::new();
        let mut current_word = String::new();
        let mut current_score = 0.0f32;

        for (token, &score) in tokens.iter().zip(scores) {
            if self.boundaries.contains(&token.as_str()) {
                continue;
            }

            match token.strip_prefix(self.marker) {
                Some(rest) => {
                    // A word with no text (a bare marker) is never emitted; its score
                    // is dropped or carried by whatever continues it.
                    if !current_word.is_empty() {
                        merged.push(WordContribution::new(
                            std::mem::take(&mut current_word),
                            current_score,
                        ));
                    }
                    current_word = rest.to_string();
                    current_score = score;
                }
                None => {
                    current_word.push_str(token);
                    current_score += score;
                }
            }
        }

        if !current_word.is_empty() {
            merged.push(WordContribution::new(current_word, current_score));
        }

        merged
    }
}

/// BERT WordPiece: `##` marks a continuation, anything else starts a word.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordPieceMerge;

impl WordPieceMerge {
    const CONTINUATION: &'static str = "##";
    const BOUNDARIES: [&'static str; 3] = ["[CLS]", "[SEP]", "[PAD]"];
}

impl SubwordMerge for WordPieceMerge {
    fn merge(&self, tokens: &[String], scores: &[f32]) -> Vec<WordContribution> {
        let mut merged: Vec<WordContribution> = Vec::new();

        for (token, &score) in tokens.iter().zip(scores) {
            if Self::BOUNDARIES.contains(&token.as_str()) {
                continue;
            }

            let Some(rest) = token.strip_prefix(Self::CONTINUATION) else {
                merged.push(WordContribution::new(token.as_str(), score));
                continue;
            };

            if let Some(word) = merged.last_mut() {
                word.word.push_str(rest);
                word.score += score;
            } else {
                merged.push(WordContribution::new(rest, score));
            }
        }

        merged
    }
}

/// The merge rule matching `family`'s tokenizer convention.
pub fn merger_for(family: TokenizerFamily) -> Box<dyn SubwordMerge> {
    match family {
        TokenizerFamily::ByteLevelBpe => Box::new(WordStartMarkerMerge::BYTE_LEVEL_BPE),
        TokenizerFamily::SentencePiece => Box::new(WordStartMarkerMerge::SENTENCEPIECE),
        TokenizerFamily::WordPiece => Box::new(WordPieceMerge),
    }
}

/// Orders words by descending absolute score (stable for ties) and keeps `top_k`.
pub fn rank_contributions(
    mut merged: Vec<WordContribution>,
    top_k: usize,
) -> Vec<WordContribution> {
    merged.sort_by(|a, b| {
        b.score
            .abs()
            .partial_cmp(&a.score.abs())
            .unwrap_or(Ordering::Equal)
    });
    merged.truncate(top_k);
    merged
}
