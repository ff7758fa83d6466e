use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// 单个标签及其得分
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// 情感分析结果
#[derive(Debug, Clone, Serialize)]
pub struct SentimentResult {
    #[serde(rename = "class")]
    pub class_id: usize,
    pub label: String,
    pub probabilities: Vec<f64>,
    pub predictions: Vec<LabelScore>,
}

/// 命名实体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NerEntity {
    pub entity_group: String,
    pub entity_group_fr: String,
    pub score: f64,
    pub start: usize,
    pub end: usize,
    pub word: String,
}

/// 命名实体识别结果
#[derive(Debug, Clone, Serialize)]
pub struct NerResult {
    pub entities: Vec<NerEntity>,
    pub entity_stats: BTreeMap<String, usize>,
    pub text: String,
}

/// 关系抽取中附带的候选实体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

/// 关系抽取结果
#[derive(Debug, Clone, Serialize)]
pub struct RelationResult {
    #[serde(rename = "class")]
    pub class_id: usize,
    pub label: String,
    pub probabilities: Vec<f64>,
    pub entities: Vec<RelationEntity>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_entities: Option<Vec<NerEntity>>,
}

/// 预测结果（按任务区分）
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PredictionResult {
    Sentiment(SentimentResult),
    Ner(NerResult),
    Relation(RelationResult),
}

impl From<SentimentResult> for PredictionResult {
    fn from(result: SentimentResult) -> Self {
        PredictionResult::Sentiment(result)
    }
}

impl From<NerResult> for PredictionResult {
    fn from(result: NerResult) -> Self {
        PredictionResult::Ner(result)
    }
}

impl From<RelationResult> for PredictionResult {
    fn from(result: RelationResult) -> Self {
        PredictionResult::Relation(result)
    }
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// 模型信息
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub task: String,
    pub source: String,
    pub cache_key: String,
    pub loaded: bool,
}
