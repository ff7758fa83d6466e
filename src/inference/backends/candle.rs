//! Candle BERT 后端
//!
//! 使用 candle 在进程内运行 BERT 编码器：
//! - 序列分类：`[CLS]` → pooler（dense + tanh）→ classifier
//! - Token 分类：每个位置的隐藏状态 → classifier → softmax
//!
//! 权重布局与 `BertForSequenceClassification` / `BertForTokenClassification`
//! 的检查点一致（`bert.*`、`bert.pooler.dense`、`classifier`）。

use crate::Result;
use crate::api::error::{FinsenseError, InferenceError, ModelError};
use crate::config::{Config, ModelSource};
use crate::inference::aggregation::aggregate_simple;
use crate::inference::backend::{
    ModelLoader, RawEntity, SequenceClassifier, TokenClassifier, TokenPrediction,
};
use crate::inference::backends::assets::{AssetResolver, ModelFiles};
use crate::inference::scores::argmax;
use candle_core::{DType, Device, IndexOp, Module, Tensor};
use candle_nn::{linear, Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokenizers::{Encoding, Tokenizer, TruncationParams};

/// config.json 中与分类头相关的字段
#[derive(Debug, Default, Deserialize)]
struct HeadConfig {
    #[serde(default)]
    model_type: Option<String>,
    #[serde(default)]
    architectures: Vec<String>,
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    hidden_size: usize,
}

/// 解析设备描述
pub fn parse_device(spec: &str) -> Result<Device> {
    let spec = spec.trim().to_lowercase();
    let device = match spec.as_str() {
        "cpu" => Ok(Device::Cpu),
        "cuda" => Device::new_cuda(0),
        "metal" => Device::new_metal(0),
        other => match other.strip_prefix("cuda:").map(str::parse::<usize>) {
            Some(Ok(ordinal)) => Device::new_cuda(ordinal),
            _ => return Err(InferenceError::UnsupportedDevice(spec.clone()).into()),
        },
    };
    device.map_err(|e| InferenceError::UnsupportedDevice(format!("{}: {}", spec, e)).into())
}

/// 按类别索引生成标签表
///
/// `id2label` 缺失的位置使用 `LABEL_<i>`；未指定数量时使用 `id2label` 的大小
/// （为空时默认 2 类）。
pub fn label_table(id2label: &HashMap<String, String>, num_labels: Option<usize>) -> Vec<String> {
    let count = num_labels.unwrap_or(if id2label.is_empty() { 2 } else { id2label.len() });
    (0..count)
        .map(|i| {
            id2label
                .get(&i.to_string())
                .cloned()
                .unwrap_or_else(|| format!("LABEL_{}", i))
        })
        .collect()
}

fn candle_error(e: candle_core::Error) -> FinsenseError {
    InferenceError::Failed(e.to_string()).into()
}

fn load_error(source: &ModelSource, reason: impl ToString) -> FinsenseError {
    ModelError::LoadFailed {
        name: source.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// 已加载的编码器及其附属资源
struct EncoderParts {
    bert: BertModel,
    vb: VarBuilder<'static>,
    hidden_size: usize,
    labels: Vec<String>,
    tokenizer: Tokenizer,
}

fn load_encoder(
    source: &ModelSource,
    files: &ModelFiles,
    device: &Device,
    max_length: usize,
    num_labels: Option<usize>,
) -> Result<EncoderParts> {
    let raw = std::fs::read_to_string(&files.config).map_err(|e| load_error(source, e))?;
    let head: HeadConfig = serde_json::from_str(&raw).map_err(|e| load_error(source, e))?;

    let is_bert = head.model_type.as_deref().map_or(true, |t| t == "bert")
        && head.architectures.iter().all(|a| a.starts_with("Bert"));
    if !is_bert {
        let name = head
            .architectures
            .first()
            .cloned()
            .or(head.model_type.clone())
            .unwrap_or_default();
        return Err(ModelError::UnsupportedArchitecture(name).into());
    }

    let config: BertConfig = serde_json::from_str(&raw).map_err(|e| load_error(source, e))?;

    let vb = (if files.is_safetensors() {
        // safetensors 以只读 mmap 方式映射，文件在进程生命周期内不会被修改
        unsafe { VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, device) }
    } else {
        VarBuilder::from_pth(&files.weights, DType::F32, device)
    })
    .map_err(|e| load_error(source, e))?;

    let bert = BertModel::load(vb.pp("bert"), &config).map_err(|e| load_error(source, e))?;

    let mut tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(|e| load_error(source, e))?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| load_error(source, e))?;
    tokenizer.with_padding(None);

    Ok(EncoderParts {
        bert,
        vb,
        hidden_size: head.hidden_size,
        labels: label_table(&head.id2label, num_labels),
        tokenizer,
    })
}

/// 编码器前向，返回 `(1, seq, hidden)`
fn encode_hidden(bert: &BertModel, encoding: &Encoding, device: &Device) -> candle_core::Result<Tensor> {
    let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
    let token_type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
    let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;
    bert.forward(&input_ids, &token_type_ids, Some(&attention_mask))
}

/// BERT 序列分类模型
pub struct BertSequenceClassifier {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    device: Device,
}

impl BertSequenceClassifier {
    fn forward(&self, encoding: &Encoding) -> candle_core::Result<Vec<f32>> {
        let hidden = encode_hidden(&self.bert, encoding, &self.device)?;
        let cls = hidden.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?;
        logits.squeeze(0)?.to_dtype(DType::F32)?.to_vec1::<f32>()
    }
}

impl SequenceClassifier for BertSequenceClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn logits(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| InferenceError::Tokenization(e.to_string()))?;
        self.forward(&encoding).map_err(candle_error)
    }
}

/// BERT token 分类模型
pub struct BertTokenClassifier {
    bert: BertModel,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    device: Device,
}

impl BertTokenClassifier {
    /// 每个位置的标签概率 `(seq, labels)`
    fn forward(&self, encoding: &Encoding) -> candle_core::Result<Vec<Vec<f32>>> {
        let hidden = encode_hidden(&self.bert, encoding, &self.device)?;
        let logits = self.classifier.forward(&hidden)?.squeeze(0)?;
        candle_nn::ops::softmax_last_dim(&logits)?
            .to_dtype(DType::F32)?
            .to_vec2::<f32>()
    }

    /// 逐 token 预测
    pub fn tag(&self, text: &str) -> Result<Vec<TokenPrediction>> {
        let encoding = self
            .tokenizer
            .encode_char_offsets(text, true)
            .map_err(|e| InferenceError::Tokenization(e.to_string()))?;
        let probabilities = self.forward(&encoding).map_err(candle_error)?;

        let ids = encoding.get_ids();
        let offsets = encoding.get_offsets();
        let special = encoding.get_special_tokens_mask();

        let mut tokens = Vec::with_capacity(ids.len());
        for (i, probs) in probabilities.iter().enumerate() {
            let Some(best) = argmax(probs) else { continue };
            let label = self
                .labels
                .get(best)
                .cloned()
                .unwrap_or_else(|| format!("LABEL_{}", best));
            tokens.push(TokenPrediction {
                id: ids[i],
                label,
                score: probs[best],
                start: offsets[i].0,
                end: offsets[i].1,
                special: special[i] == 1,
            });
        }
        Ok(tokens)
    }
}

impl TokenClassifier for BertTokenClassifier {
    fn entities(&self, text: &str) -> Result<Vec<RawEntity>> {
        let tokens = self.tag(text)?;
        aggregate_simple(&tokens, |ids| {
            self.tokenizer
                .decode(ids, true)
                .map_err(|e| InferenceError::Tokenization(e.to_string()).into())
        })
    }
}

/// Candle 模型加载器
pub struct CandleLoader {
    device: Device,
    max_length: usize,
    resolver: AssetResolver,
}

impl CandleLoader {
    pub fn new(device: Device, max_length: usize, resolver: AssetResolver) -> Self {
        Self {
            device,
            max_length,
            resolver,
        }
    }

    /// 从配置创建
    pub fn from_config(config: &Config) -> Result<Self> {
        let device = parse_device(&config.inference.device)?;
        Ok(Self::new(
            device,
            config.inference.max_length,
            AssetResolver::new(config.models.hub_cache_dir.clone()),
        ))
    }
}

impl ModelLoader for CandleLoader {
    fn load_sequence_classifier(
        &self,
        source: &ModelSource,
        num_labels: Option<usize>,
    ) -> Result<Arc<dyn SequenceClassifier>> {
        tracing::info!("Loading sequence classifier from {}", source);
        let files = self.resolver.resolve(source)?;
        let parts = load_encoder(source, &files, &self.device, self.max_length, num_labels)?;

        let hidden = parts.hidden_size;
        let pooler = linear(hidden, hidden, parts.vb.pp("bert.pooler.dense"))
            .map_err(|e| load_error(source, e))?;
        let classifier = linear(hidden, parts.labels.len(), parts.vb.pp("classifier"))
            .map_err(|e| load_error(source, e))?;

        tracing::info!(
            "Loaded sequence classifier {} with {} labels",
            source,
            parts.labels.len()
        );
        Ok(Arc::new(BertSequenceClassifier {
            bert: parts.bert,
            pooler,
            classifier,
            tokenizer: parts.tokenizer,
            labels: parts.labels,
            device: self.device.clone(),
        }))
    }

    fn load_token_classifier(&self, source: &ModelSource) -> Result<Arc<dyn TokenClassifier>> {
        tracing::info!("Loading token classifier from {}", source);
        let files = self.resolver.resolve(source)?;
        let parts = load_encoder(source, &files, &self.device, self.max_length, None)?;

        let classifier = linear(parts.hidden_size, parts.labels.len(), parts.vb.pp("classifier"))
            .map_err(|e| load_error(source, e))?;

        tracing::info!(
            "Loaded token classifier {} with {} labels",
            source,
            parts.labels.len()
        );
        Ok(Arc::new(BertTokenClassifier {
            bert: parts.bert,
            classifier,
            tokenizer: parts.tokenizer,
            labels: parts.labels,
            device: self.device.clone(),
        }))
    }
}
