use std::io;
use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};

/// Loads a tokenizer from a model directory or explicit tokenizer.json path.
pub fn load_tokenizer(model_path: &Path) -> io::Result<Tokenizer> {
    let tokenizer_path = if model_path
        .file_name()
        .is_some_and(|name| name == std::ffi::OsStr::new("tokenizer.json"))
    {
        model_path.to_path_buf()
    } else if model_path.is_dir() {
        model_path.join("tokenizer.json")
    } else {
        model_path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Model path has no parent"))?
            .join("tokenizer.json")
    };

    let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(io::Error::other)?;

    // Chunking must see the whole document, so strip any truncation or padding the
    // checkpoint shipped with.
    tokenizer
        .with_truncation(None)
        .map_err(|e| io::Error::other(format!("Failed to disable truncation: {}", e)))?;
    tokenizer.with_padding(None);

    Ok(tokenizer)
}

/// Clones `tokenizer` with truncation to `max_len` tokens (special tokens included).
pub fn with_truncation(tokenizer: &Tokenizer, max_len: usize) -> io::Result<Tokenizer> {
    let mut truncating = tokenizer.clone();

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    truncating
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    Ok(truncating)
}

/// Reads `model_type` and the label count from a Hugging Face `config.json`.
pub fn read_model_metadata(config_json: &str) -> io::Result<ModelMetadata> {
    let value: serde_json::Value = serde_json::from_str(config_json)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let model_type = value
        .get("model_type")
        .and_then(|v| v.as_str())
        .unwrap_or("roberta")
        .to_string();

    let mut labels: Vec<(usize, String)> = value
        .get("id2label")
        .and_then(|v| v.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| Some((k.parse().ok()?, v.as_str()?.to_lowercase())))
                .collect()
        })
        .unwrap_or_default();
    labels.sort_by_key(|(idx, _)| *idx);

    Ok(ModelMetadata {
        model_type,
        labels: labels.into_iter().map(|(_, name)| name).collect(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMetadata {
    pub model_type: String,
    /// Label names in output order; empty when the config has no `id2label`.
    pub labels: Vec<String>,
}
