//! Tiny randomly initialised classifier checkpoints written to a temp dir.
//!
//! Each checkpoint has the three files the loader reads: `config.json`,
//! `model.safetensors` and a word-level `tokenizer.json`. Weights are random, so
//! only shapes and plumbing are meaningful, not the predicted labels.

use std::path::Path;

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::xlm_roberta::{
    Config as RobertaConfig, XLMRobertaForSequenceClassification,
};
use serde_json::{Value, json};
use tempfile::TempDir;

pub const HIDDEN_SIZE: usize = 16;

const ID2LABEL: [(&str, &str); 3] = [("0", "negative"), ("1", "neutral"), ("2", "positive")];

pub const ROBERTA_SPECIALS: [&str; 5] = ["<s>", "<pad>", "</s>", "<unk>", "<mask>"];

const ROBERTA_WORDS: [&str; 12] = [
    "good", "Ġgood", "movie", "Ġmovie", "bad", "Ġbad", "Ġfilm", "Ġgreat", "Ġterrible", ".",
    "Ġthe", "the",
];

pub const BERT_SPECIALS: [&str; 5] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]"];

const BERT_WORDS: [&str; 10] = [
    "good", "movie", "bad", "film", "great", "terrible", "the", "play", "##ful", ".",
];

fn id2label() -> Value {
    ID2LABEL
        .iter()
        .map(|(id, label)| (id.to_string(), json!(label)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn vocab(specials: &[&str], words: &[&str]) -> Value {
    specials
        .iter()
        .chain(words)
        .enumerate()
        .map(|(id, token)| (token.to_string(), json!(id)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn added_tokens(specials: &[&str]) -> Value {
    specials
        .iter()
        .enumerate()
        .map(|(id, token)| {
            json!({
                "id": id,
                "content": token,
                "single_word": false,
                "lstrip": false,
                "rstrip": false,
                "normalized": false,
                "special": true,
            })
        })
        .collect()
}

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// RoBERTa checkpoint with a byte-level tokenizer (`Ġ` word marker, `<mask>`).
pub fn roberta_checkpoint() -> TempDir {
    let dir = TempDir::new().unwrap();
    let vocab_size = ROBERTA_SPECIALS.len() + ROBERTA_WORDS.len();

    let config = json!({
        "architectures": ["RobertaForSequenceClassification"],
        "model_type": "roberta",
        "vocab_size": vocab_size,
        "hidden_size": HIDDEN_SIZE,
        "num_hidden_layers": 1,
        "num_attention_heads": 2,
        "intermediate_size": 32,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.1,
        "attention_probs_dropout_prob": 0.1,
        "max_position_embeddings": 514,
        "type_vocab_size": 1,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-5,
        "pad_token_id": 1,
        "bos_token_id": 0,
        "eos_token_id": 2,
        "position_embedding_type": "absolute",
        "id2label": id2label(),
    });
    write_json(&dir.path().join("config.json"), &config);

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    let roberta_config: RobertaConfig = serde_json::from_value(config).unwrap();
    XLMRobertaForSequenceClassification::new(3, &roberta_config, vb).unwrap();
    varmap.save(dir.path().join("model.safetensors")).unwrap();

    let tokenizer = json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens(&ROBERTA_SPECIALS),
        "normalizer": null,
        "pre_tokenizer": {
            "type": "ByteLevel",
            "add_prefix_space": false,
            "trim_offsets": true,
            "use_regex": true,
        },
        "post_processor": {
            "type": "RobertaProcessing",
            "sep": ["</s>", 2],
            "cls": ["<s>", 0],
            "trim_offsets": true,
            "add_prefix_space": false,
        },
        "decoder": {
            "type": "ByteLevel",
            "add_prefix_space": true,
            "trim_offsets": true,
            "use_regex": true,
        },
        "model": {
            "type": "WordLevel",
            "vocab": vocab(&ROBERTA_SPECIALS, &ROBERTA_WORDS),
            "unk_token": "<unk>",
        },
    });
    write_json(&dir.path().join("tokenizer.json"), &tokenizer);

    dir
}

/// BERT checkpoint (encoder, pooler and linear head) with a `##` word-piece style
/// tokenizer and `[MASK]`.
pub fn bert_checkpoint() -> TempDir {
    let dir = TempDir::new().unwrap();
    let vocab_size = BERT_SPECIALS.len() + BERT_WORDS.len();

    let config = json!({
        "architectures": ["BertForSequenceClassification"],
        "model_type": "bert",
        "vocab_size": vocab_size,
        "hidden_size": HIDDEN_SIZE,
        "num_hidden_layers": 1,
        "num_attention_heads": 2,
        "intermediate_size": 32,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.1,
        "attention_probs_dropout_prob": 0.1,
        "max_position_embeddings": 512,
        "type_vocab_size": 2,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-12,
        "pad_token_id": 0,
        "id2label": id2label(),
    });
    write_json(&dir.path().join("config.json"), &config);

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    let bert_config: BertConfig = serde_json::from_value(config).unwrap();
    BertModel::load(vb.pp("bert"), &bert_config).unwrap();
    candle_nn::linear(HIDDEN_SIZE, HIDDEN_SIZE, vb.pp("bert.pooler.dense")).unwrap();
    candle_nn::linear(HIDDEN_SIZE, 3, vb.pp("classifier")).unwrap();
    varmap.save(dir.path().join("model.safetensors")).unwrap();

    let tokenizer = json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens(&BERT_SPECIALS),
        "normalizer": null,
        "pre_tokenizer": { "type": "BertPreTokenizer" },
        "post_processor": {
            "type": "BertProcessing",
            "sep": ["[SEP]", 3],
            "cls": ["[CLS]", 2],
        },
        "decoder": { "type": "WordPiece", "prefix": "##", "cleanup": true },
        "model": {
            "type": "WordLevel",
            "vocab": vocab(&BERT_SPECIALS, &BERT_WORDS),
            "unk_token": "[UNK]",
        },
    });
    write_json(&dir.path().join("tokenizer.json"), &tokenizer);

    dir
}
