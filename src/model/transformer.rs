use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::classifier::SequenceClassifier;
use super::config::ModelConfig;
use super::device::select_device;
use super::error::ModelError;
use super::family::TokenizerFamily;
use super::utils::{load_tokenizer, read_model_metadata, with_truncation};
use super::{SentimentModel, TokenPiece};
use crate::constants::{LABELS, NUM_LABELS};

const MASK_TOKENS: [&str; 2] = ["<mask>", "[MASK]"];

/// Candle-backed RoBERTa / BERT sentiment classifier.
pub struct TransformerModel {
    device: Device,
    config: ModelConfig,
    family: TokenizerFamily,
    classifier: SequenceClassifier,
    /// Untruncated; used for chunking and decoding.
    tokenizer: Tokenizer,
    /// Truncates to `config.max_seq_len`; used for everything the classifier consumes.
    truncating: Tokenizer,
    mask_token_id: Option<u32>,
}

impl std::fmt::Debug for TransformerModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerModel")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("family", &self.family)
            .field("roberta", &self.classifier.is_roberta())
            .finish()
    }
}

impl TransformerModel {
    pub fn load(config: ModelConfig) -> Result<Self, ModelError> {
        if let Err(msg) = config.validate() {
            return Err(ModelError::InvalidConfig { reason: msg });
        }

        let model_path = config
            .model_path
            .clone()
            .ok_or_else(|| ModelError::InvalidConfig {
                reason: "TransformerModel requires a model path".to_string(),
            })?;

        if !model_path.exists() {
            return Err(ModelError::ModelNotFound { path: model_path });
        }

        let config_path = model_path.join("config.json");
        if !config_path.exists() {
            return Err(ModelError::ModelLoadFailed {
                reason: format!("Missing config.json in {}", model_path.display()),
            });
        }

        let weights_path = model_path.join("model.safetensors");
        if !weights_path.exists() {
            return Err(ModelError::ModelLoadFailed {
                reason: format!("Missing model.safetensors in {}", model_path.display()),
            });
        }

        let metadata = read_model_metadata(&std::fs::read_to_string(&config_path)?)?;
        if !metadata.labels.is_empty() {
            if metadata.labels.len() != NUM_LABELS {
                return Err(ModelError::InvalidConfig {
                    reason: format!(
                        "expected {} output labels, config.json declares {}",
                        NUM_LABELS,
                        metadata.labels.len()
                    ),
                });
            }
            if metadata.labels.iter().map(String::as_str).ne(LABELS) {
                warn!(
                    labels = ?metadata.labels,
                    expected = ?LABELS,
                    "Model label names differ; outputs are read positionally"
                );
            }
        }

        let family = config
            .tokenizer_family
            .unwrap_or_else(|| TokenizerFamily::from_model_type(&metadata.model_type));

        let device = select_device(config.device)?;
        debug!(?device, "Selected compute device for sentiment classifier");

        info!(
            model_path = %model_path.display(),
            model_type = %metadata.model_type,
            tokenizer_family = %family,
            "Loading sentiment classifier"
        );

        let classifier = SequenceClassifier::load(&model_path, NUM_LABELS, &device).map_err(
            |e| ModelError::ModelLoadFailed {
                reason: format!("Failed to load classifier weights: {}", e),
            },
        )?;

        let tokenizer = load_tokenizer(&model_path).map_err(|e| ModelError::ModelLoadFailed {
            reason: format!("Failed to load tokenizer: {}", e),
        })?;
        let truncating = with_truncation(&tokenizer, config.max_seq_len).map_err(|e| {
            ModelError::ModelLoadFailed {
                reason: format!("Failed to configure tokenizer: {}", e),
            }
        })?;

        let mask_token_id = MASK_TOKENS
            .iter()
            .find_map(|token| tokenizer.token_to_id(token));

        info!(
            roberta = classifier.is_roberta(),
            has_mask_token = mask_token_id.is_some(),
            "Sentiment classifier loaded successfully"
        );

        Ok(Self {
            device,
            config,
            family,
            classifier,
            tokenizer,
            truncating,
            mask_token_id,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    fn to_batch(&self, values: &[u32]) -> Result<Tensor, ModelError> {
        Ok(Tensor::new(values, &self.device)?.unsqueeze(0)?)
    }
}

impl SentimentModel for TransformerModel {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ModelError> {
        let encoding =
            self.tokenizer
                .encode(text, false)
                .map_err(|e| ModelError::TokenizationFailed {
                    reason: e.to_string(),
                })?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, ModelError> {
        self.tokenizer
            .decode(ids, false)
            .map_err(|e| ModelError::TokenizationFailed {
                reason: e.to_string(),
            })
    }

    fn tokenize(&self, text: &str) -> Result<Vec<TokenPiece>, ModelError> {
        let encoding =
            self.truncating
                .encode(text, true)
                .map_err(|e| ModelError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        Ok(encoding
            .get_ids()
            .iter()
            .zip(encoding.get_tokens())
            .zip(encoding.get_special_tokens_mask())
            .map(|((&id, token), &special)| TokenPiece {
                id,
                text: token.clone(),
                special: special == 1,
            })
            .collect())
    }

    fn predict_raw(&self, text: &str) -> Result<[f32; NUM_LABELS], ModelError> {
        let encoding =
            self.truncating
                .encode(text, true)
                .map_err(|e| ModelError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        debug!(
            text_len = text.len(),
            tokens = encoding.get_ids().len(),
            "Running sentiment classifier"
        );

        let input_ids = self.to_batch(encoding.get_ids())?;
        let type_ids = self.to_batch(encoding.get_type_ids())?;
        let attention_mask = self.to_batch(encoding.get_attention_mask())?;

        let logits = self
            .classifier
            .forward(&input_ids, &type_ids, &attention_mask)
            .map_err(|e| ModelError::InferenceFailed {
                reason: e.to_string(),
            })?
            .flatten_all()?
            .to_vec1::<f32>()?;

        logits
            .try_into()
            .map_err(|logits: Vec<f32>| ModelError::InferenceFailed {
                reason: format!(
                    "classifier returned {} logits, expected {}",
                    logits.len(),
                    NUM_LABELS
                ),
            })
    }

    fn mask_token_id(&self) -> Option<u32> {
        self.mask_token_id
    }

    fn tokenizer_family(&self) -> TokenizerFamily {
        self.family
    }

    fn max_input_tokens(&self) -> usize {
        self.config.max_seq_len
    }
}
