//! Word-list sentiment stub.
//!
//! Tokenizes like a byte-level BPE model (`Ġ` marks a word that followed whitespace,
//! long words and punctuation split into continuation pieces) and scores text by
//! counting hits against small positive and negative word lists.
//!
//! Piece ids are an FNV-1a hash of the piece, so encoding needs no shared vocabulary.
//! Only [`SentimentModel::decode`] needs ids mapped back to text, and it reads them
//! from a bounded LRU of recently encoded pieces. Decoding an id that has been
//! evicted fails with [`ModelError::TokenizationFailed`].

use std::sync::Arc;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use super::error::ModelError;
use super::family::TokenizerFamily;
use super::{SentimentModel, TokenPiece};
use crate::constants::{DEFAULT_LEXICON_PIECE_CAPACITY, MODEL_MAX_SEQ_LEN, NUM_LABELS};

const BOS: &str = "<s>";
const PAD: &str = "<pad>";
const EOS: &str = "</s>";
const UNK: &str = "<unk>";
/// Specials take the ids below [`FIRST_PIECE_ID`], in this order.
const SPECIAL_TOKENS: [&str; 4] = [BOS, PAD, EOS, UNK];
const BOS_ID: u32 = 0;
const EOS_ID: u32 = 2;
const FIRST_PIECE_ID: u32 = SPECIAL_TOKENS.len() as u32;

const WORD_MARKER: char = 'Ġ';

/// Longest alphanumeric piece before a word is split into continuations.
const MAX_PIECE_CHARS: usize = 6;

const POLARITY_WEIGHT: f32 = 1.5;
const NEUTRAL_BIAS: f32 = 1.0;

const POSITIVE_WORDS: &[&str] = &[
    "amazing", "awesome", "beautiful", "best", "brilliant", "delightful", "enjoy", "enjoyed",
    "excellent", "fantastic", "fun", "glad", "good", "great", "happy", "love", "loved",
    "lovely", "nice", "perfect", "pleasant", "recommend", "superb", "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "angry", "awful", "bad", "boring", "broken", "disappointed", "disappointing",
    "disgusting", "dreadful", "fail", "failed", "hate", "hated", "horrible", "poor", "sad",
    "terrible", "ugly", "unhappy", "useless", "waste", "worse", "worst", "wrong",
];

/// 32-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    bytes
        .iter()
        .fold(OFFSET_BASIS, |hash, &b| (hash ^ b as u32).wrapping_mul(PRIME))
}

/// Id a piece hashes to before any collision step; never a special id.
fn home_id(piece: &str) -> u32 {
    FIRST_PIECE_ID + fnv1a(piece.as_bytes()) % (u32::MAX - FIRST_PIECE_ID + 1)
}

fn next_id(id: u32) -> u32 {
    if id == u32::MAX { FIRST_PIECE_ID } else { id + 1 }
}

/// Deterministic stand-in for a RoBERTa sentiment classifier.
pub struct LexiconModel {
    /// Piece text by id, for decoding.
    pieces: Cache<u32, Arc<str>>,
    piece_capacity: u64,
    max_seq_len: usize,
}

impl std::fmt::Debug for LexiconModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexiconModel")
            .field("cached_pieces", &self.pieces.entry_count())
            .field("piece_capacity", &self.piece_capacity)
            .field("max_seq_len", &self.max_seq_len)
            .finish()
    }
}

impl Default for LexiconModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconModel {
    pub fn new() -> Self {
        Self::with_max_seq_len(MODEL_MAX_SEQ_LEN)
    }

    pub fn with_max_seq_len(max_seq_len: usize) -> Self {
        Self::with_limits(max_seq_len, DEFAULT_LEXICON_PIECE_CAPACITY)
    }

    /// `piece_capacity` bounds how many distinct pieces stay decodable.
    pub fn with_limits(max_seq_len: usize, piece_capacity: u64) -> Self {
        let piece_capacity = piece_capacity.max(1);
        Self {
            pieces: Cache::builder()
                .max_capacity(piece_capacity)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
            piece_capacity,
            max_seq_len: max_seq_len.max(3),
        }
    }

    pub fn piece_capacity(&self) -> u64 {
        self.piece_capacity
    }

    /// Pieces currently decodable, after pending evictions are applied.
    pub fn cached_pieces(&self) -> u64 {
        self.pieces.run_pending_tasks();
        self.pieces.entry_count()
    }

    /// Id for `piece`, recording it for decoding. A piece whose hash is taken by a
    /// different cached piece moves to the next free id.
    fn piece_id(&self, piece: &str) -> u32 {
        let mut id = home_id(piece);
        loop {
            let entry = self.pieces.entry(id).or_insert_with(|| Arc::from(piece));
            if &**entry.value() == piece {
                return id;
            }
            id = next_id(id);
        }
    }

    /// Splits text into vocabulary pieces.
    fn split_pieces(text: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut after_space = false;
        let mut word = String::new();

        let flush = |word: &mut String, marked: bool, pieces: &mut Vec<String>| {
            if word.is_empty() {
                return;
            }
            split_word(word, marked, pieces);
            word.clear();
        };

        let mut word_marked = false;
        for c in text.chars() {
            if c.is_whitespace() {
                flush(&mut word, word_marked, &mut pieces);
                after_space = true;
            } else {
                if word.is_empty() {
                    word_marked = after_space;
                }
                word.push(c);
                after_space = false;
            }
        }
        flush(&mut word, word_marked, &mut pieces);

        pieces
    }

    /// Lowercased alphanumeric words of `pieces`, as they read once joined.
    fn words_in(pieces: &[String]) -> Vec<String> {
        join_pieces(pieces.iter().map(String::as_str))
            .split_whitespace()
            .map(|w| {
                w.chars()
                    .filter(|c| c.is_alphanumeric())
                    .flat_map(char::to_lowercase)
                    .collect::<String>()
            })
            .filter(|w| !w.is_empty())
            .collect()
    }
}

/// Rebuilds text from pieces: a marked piece starts a new space-separated word.
fn join_pieces<'a>(pieces: impl IntoIterator<Item = &'a str>) -> String {
    let mut text = String::new();
    for piece in pieces {
        match piece.strip_prefix(WORD_MARKER) {
            Some(rest) => {
                text.push(' ');
                text.push_str(rest);
            }
            None => text.push_str(piece),
        }
    }
    text
}

/// Pushes the pieces of one whitespace-free word: alphanumeric runs capped at
/// [`MAX_PIECE_CHARS`], every other character on its own. Only the first piece
/// carries the word marker.
fn split_word(word: &str, marked: bool, pieces: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_len = 0;
    let mut first = true;

    let emit = |piece: &mut String, first: &mut bool, pieces: &mut Vec<String>| {
        if piece.is_empty() {
            return;
        }
        if *first && marked {
            pieces.push(format!("{WORD_MARKER}{piece}"));
        } else {
            pieces.push(piece.clone());
        }
        *first = false;
        piece.clear();
    };

    for c in word.chars() {
        if c.is_alphanumeric() {
            if current_len == MAX_PIECE_CHARS {
                emit(&mut current, &mut first, pieces);
                current_len = 0;
            }
            current.push(c);
            current_len += 1;
        } else {
            emit(&mut current, &mut first, pieces);
            current_len = 0;
            let mut punct = c.to_string();
            emit(&mut punct, &mut first, pieces);
        }
    }
    emit(&mut current, &mut first, pieces);
}

impl SentimentModel for LexiconModel {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ModelError> {
        Ok(Self::split_pieces(text)
            .iter()
            .map(|piece| self.piece_id(piece))
            .collect())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, ModelError> {
        let pieces = ids
            .iter()
            .map(|&id| match SPECIAL_TOKENS.get(id as usize) {
                Some(special) => Ok(Arc::from(*special)),
                None => self
                    .pieces
                    .get(&id)
                    .ok_or_else(|| ModelError::TokenizationFailed {
                        reason: format!("unknown token id {id}"),
                    }),
            })
            .collect::<Result<Vec<Arc<str>>, ModelError>>()?;
        Ok(join_pieces(pieces.iter().map(|piece| &**piece)))
    }

    fn tokenize(&self, text: &str) -> Result<Vec<TokenPiece>, ModelError> {
        let mut pieces = Self::split_pieces(text);
        pieces.truncate(self.max_seq_len - 2);

        let special = |id: u32| TokenPiece {
            id,
            text: SPECIAL_TOKENS[id as usize].to_string(),
            special: true,
        };

        Ok(std::iter::once(special(BOS_ID))
            .chain(pieces.into_iter().map(|piece| TokenPiece {
                id: self.piece_id(&piece),
                text: piece,
                special: false,
            }))
            .chain(std::iter::once(special(EOS_ID)))
            .collect())
    }

    fn predict_raw(&self, text: &str) -> Result<[f32; NUM_LABELS], ModelError> {
        let mut pieces = Self::split_pieces(text);
        pieces.truncate(self.max_seq_len - 2);

        let (mut positive, mut negative) = (0usize, 0usize);
        for word in Self::words_in(&pieces) {
            if POSITIVE_WORDS.contains(&word.as_str()) {
                positive += 1;
            } else if NEGATIVE_WORDS.contains(&word.as_str()) {
                negative += 1;
            }
        }

        Ok([
            POLARITY_WEIGHT * negative as f32,
            NEUTRAL_BIAS,
            POLARITY_WEIGHT * positive as f32,
        ])
    }

    fn mask_token_id(&self) -> Option<u32> {
        None
    }

    fn tokenizer_family(&self) -> TokenizerFamily {
        TokenizerFamily::ByteLevelBpe
    }

    fn max_input_tokens(&self) -> usize {
        self.max_seq_len
    }

    fn is_stub(&self) -> bool {
        true
    }
}
