use std::path::PathBuf;

use tracing::warn;

use super::device::DevicePreference;
use super::family::TokenizerFamily;
use crate::constants::MODEL_MAX_SEQ_LEN;

/// Classifier loading options.
///
/// With no `model_path` the crate runs on the lexicon stub (see
/// [`crate::model::LexiconModel`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_path: Option<PathBuf>,

    /// Overrides the family detected from `config.json`.
    pub tokenizer_family: Option<TokenizerFamily>,

    pub device: DevicePreference,

    /// Prediction inputs are truncated to this many tokens, special tokens included.
    pub max_seq_len: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            tokenizer_family: None,
            device: DevicePreference::Auto,
            max_seq_len: MODEL_MAX_SEQ_LEN,
        }
    }
}

impl ModelConfig {
    const ENV_MODEL_PATH: &'static str = "POLARITY_MODEL_PATH";
    const ENV_TOKENIZER_FAMILY: &'static str = "POLARITY_TOKENIZER_FAMILY";
    const ENV_DEVICE: &'static str = "POLARITY_DEVICE";

    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_tokenizer_family(mut self, family: TokenizerFamily) -> Self {
        self.tokenizer_family = Some(family);
        self
    }

    pub fn with_device(mut self, device: DevicePreference) -> Self {
        self.device = device;
        self
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        assert!(max_seq_len >= 3, "max_seq_len must leave room for content");
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn is_stub(&self) -> bool {
        self.model_path.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_seq_len < 3 {
            return Err(format!(
                "max_seq_len must be at least 3, got {}",
                self.max_seq_len
            ));
        }

        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err("model_path cannot be empty when provided".to_string());
        }

        Ok(())
    }

    /// Reads `POLARITY_MODEL_PATH`, `POLARITY_TOKENIZER_FAMILY` and `POLARITY_DEVICE`.
    ///
    /// Unparseable family or device values are logged and ignored.
    pub fn from_env() -> Self {
        let model_path = std::env::var(Self::ENV_MODEL_PATH)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let tokenizer_family = std::env::var(Self::ENV_TOKENIZER_FAMILY)
            .ok()
            .filter(|v| !v.trim().is_empty() && v.trim() != "auto")
            .and_then(|v| match v.parse() {
                Ok(family) => Some(family),
                Err(e) => {
                    warn!(error = %e, "Ignoring {}", Self::ENV_TOKENIZER_FAMILY);
                    None
                }
            });

        let device = std::env::var(Self::ENV_DEVICE)
            .ok()
            .and_then(|v| match v.parse() {
                Ok(device) => Some(device),
                Err(e) => {
                    warn!(error = %e, "Ignoring {}", Self::ENV_DEVICE);
                    None
                }
            })
            .unwrap_or_default();

        Self {
            model_path,
            tokenizer_family,
            device,
            max_seq_len: MODEL_MAX_SEQ_LEN,
        }
    }
}
