//! 推理后端抽象
//!
//! 定义模型能力的统一接口：序列分类（情感、关系）和 token 分类（NER）。
//! 预测逻辑只依赖这些 trait，具体实现（Candle BERT）位于 `backends`。

use crate::Result;
use crate::api::error::InferenceError;
use crate::config::ModelSource;
use std::sync::Arc;

/// 分类得分的激活方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreActivation {
    /// 多标签互斥，得分和为 1
    Softmax,
    /// 单标签模型，独立概率
    Sigmoid,
}

impl ScoreActivation {
    /// 根据标签数量选择激活方式
    pub fn for_labels(num_labels: usize) -> Self {
        if num_labels == 1 {
            ScoreActivation::Sigmoid
        } else {
            ScoreActivation::Softmax
        }
    }
}

/// 序列分类能力
///
/// 给定文本，返回每个标签的原始 logits，顺序与 `labels()` 一致。
pub trait SequenceClassifier: Send + Sync {
    /// 按类别索引排列的标签
    fn labels(&self) -> &[String];

    /// 计算 logits
    fn logits(&self, text: &str) -> Result<Vec<f32>>;

    /// 得分激活方式
    fn activation(&self) -> ScoreActivation {
        ScoreActivation::for_labels(self.labels().len())
    }
}

/// 单个 token 的分类结果
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPrediction {
    /// token id
    pub id: u32,
    /// 预测标签，例如 `B-CORP`
    pub label: String,
    /// 预测标签的概率
    pub score: f32,
    /// 字符起始偏移
    pub start: usize,
    /// 字符结束偏移
    pub end: usize,
    /// 是否为特殊 token（`[CLS]`、`[SEP]` 等）
    pub special: bool,
}

/// 聚合后的实体（尚未翻译）
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntity {
    pub entity_group: String,
    pub score: f32,
    pub start: usize,
    pub end: usize,
    pub word: String,
}

/// Token 分类能力
pub trait TokenClassifier: Send + Sync {
    /// 识别文本中的实体
    fn entities(&self, text: &str) -> Result<Vec<RawEntity>>;
}

/// 模型加载器
///
/// 加载是阻塞操作（下载、读取权重），调用方负责放到阻塞线程池。
pub trait ModelLoader: Send + Sync {
    /// 加载序列分类模型
    ///
    /// `num_labels` 为 `Some` 时强制分类头的输出维度。
    fn load_sequence_classifier(
        &self,
        source: &ModelSource,
        num_labels: Option<usize>,
    ) -> Result<Arc<dyn SequenceClassifier>>;

    /// 加载 token 分类模型
    fn load_token_classifier(&self, source: &ModelSource) -> Result<Arc<dyn TokenClassifier>>;
}

/// 在阻塞线程池中执行推理或加载
pub async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| InferenceError::Aborted(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::FinsenseError;

    #[test]
    fn test_activation_for_labels() {
        assert_eq!(ScoreActivation::for_labels(1), ScoreActivation::Sigmoid);
        assert_eq!(ScoreActivation::for_labels(3), ScoreActivation::Softmax);
    }

    #[tokio::test]
    async fn test_run_blocking_returns_value() {
        let value = run_blocking(|| Ok(21 * 2)).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_run_blocking_propagates_error() {
        let err = run_blocking::<(), _>(|| Err(InferenceError::Failed("boom".to_string()).into()))
            .await
            .unwrap_err();
        assert!(matches!(err, FinsenseError::Inference(InferenceError::Failed(_))));
    }

    #[tokio::test]
    async fn test_run_blocking_reports_panic() {
        let err = run_blocking::<(), _>(|| panic!("worker panic")).await.unwrap_err();
        assert!(matches!(err, FinsenseError::Inference(InferenceError::Aborted(_))));
    }
}
