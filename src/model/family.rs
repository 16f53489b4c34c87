use std::fmt;
use std::str::FromStr;

use super::error::ModelError;

/// Sub-word convention of a tokenizer.
///
/// Word contributions are rebuilt from sub-word tokens, and the rule for doing so
/// depends on how the tokenizer marks word boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenizerFamily {
    /// GPT-2 / RoBERTa byte-level BPE: `Ġ` starts a word, `<s>` / `</s>` bound the sequence.
    #[default]
    ByteLevelBpe,
    /// SentencePiece (XLM-R, CamemBERT): `▁` starts a word, `<s>` / `</s>` bound the sequence.
    SentencePiece,
    /// BERT WordPiece: `##` continues a word, `[CLS]` / `[SEP]` bound the sequence.
    WordPiece,
}

impl TokenizerFamily {
    /// Maps a Hugging Face `config.json` `model_type` to its tokenizer family.
    pub fn from_model_type(model_type: &str) -> Self {
        match model_type.to_ascii_lowercase().as_str() {
            "bert" | "distilbert" | "electra" | "mobilebert" => Self::WordPiece,
            "xlm-roberta" | "xlm_roberta" | "camembert" | "albert" => Self::SentencePiece,
            _ => Self::ByteLevelBpe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByteLevelBpe => "byte-level-bpe",
            Self::SentencePiece => "sentencepiece",
            Self::WordPiece => "wordpiece",
        }
    }
}

impl fmt::Display for TokenizerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenizerFamily {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "byte-level-bpe" | "bpe" | "roberta" => Ok(Self::ByteLevelBpe),
            "sentencepiece" | "spm" => Ok(Self::SentencePiece),
            "wordpiece" | "bert" => Ok(Self::WordPiece),
            other => Err(ModelError::InvalidConfig {
                reason: format!("unknown tokenizer family '{other}'"),
            }),
        }
    }
}
