use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_core::IndexOp;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::xlm_roberta::{
    Config as RobertaConfig, XLMRobertaForSequenceClassification,
};
use std::path::Path;
use std::sync::Arc;

/// BERT encoder with the standard pooler (`dense` + tanh over `[CLS]`) and a linear head.
struct BertForSequenceClassificationImpl {
    bert: BertModel,
    pooler: Option<Linear>,
    classifier: Linear,
}

impl BertForSequenceClassificationImpl {
    fn load(vb: VarBuilder, config: &BertConfig, num_labels: usize) -> Result<Self> {
        let (bert, pooler) = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            let pooler = if vb.contains_tensor("bert.pooler.dense.weight") {
                Some(candle_nn::linear(
                    config.hidden_size,
                    config.hidden_size,
                    vb.pp("bert.pooler.dense"),
                )?)
            } else {
                None
            };
            (BertModel::load(vb.pp("bert"), config)?, pooler)
        } else {
            (BertModel::load(vb.clone(), config)?, None)
        };

        let classifier = candle_nn::linear(config.hidden_size, num_labels, vb.pp("classifier"))?;

        Ok(Self {
            bert,
            pooler,
            classifier,
        })
    }

    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let output = self
            .bert
            .forward(input_ids, token_type_ids, Some(attention_mask))?;
        let cls_token = output.i((.., 0, ..))?;
        let pooled = match &self.pooler {
            Some(dense) => dense.forward(&cls_token)?.tanh()?,
            None => cls_token,
        };
        self.classifier.forward(&pooled)
    }
}

enum ClassifierImpl {
    /// RoBERTa checkpoints (`roberta.*` weights). XLM-R shares the architecture,
    /// including the `padding_idx + 1` position offset and the two-layer head.
    Roberta(XLMRobertaForSequenceClassification),
    Bert(BertForSequenceClassificationImpl),
}

/// Sequence classifier producing raw logits of shape `(batch, num_labels)`.
#[derive(Clone)]
pub struct SequenceClassifier(Arc<ClassifierImpl>);

impl SequenceClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P, num_labels: usize, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");

        let config_content = std::fs::read_to_string(config_path)?;

        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };

        let model = if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
            let config: RobertaConfig = serde_json::from_str(&config_content)
                .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;
            ClassifierImpl::Roberta(XLMRobertaForSequenceClassification::new(
                num_labels, &config, vb,
            )?)
        } else {
            let config: BertConfig = serde_json::from_str(&config_content)
                .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;
            ClassifierImpl::Bert(BertForSequenceClassificationImpl::load(
                vb, &config, num_labels,
            )?)
        };

        Ok(Self(Arc::new(model)))
    }

    pub fn is_roberta(&self) -> bool {
        matches!(*self.0, ClassifierImpl::Roberta(_))
    }

    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        match &*self.0 {
            ClassifierImpl::Roberta(model) => {
                model.forward(input_ids, attention_mask, token_type_ids)
            }
            ClassifierImpl::Bert(model) => model.forward(input_ids, token_type_ids, attention_mask),
        }
    }
}
