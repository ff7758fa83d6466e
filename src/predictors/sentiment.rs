//! 情感分析

use crate::Result;
use crate::api::error::InferenceError;
use crate::api::response::{LabelScore, SentimentResult};
use crate::core::registry::ModelRegistry;
use crate::inference::scores::activate;
use crate::inference::{run_blocking, SequenceClassifier};
use crate::models::labels::translate_sentiment;
use crate::predictors::preview;
use std::sync::Arc;

/// 情感分析
///
/// 计算每个标签的得分并按得分降序排列，最高分标签翻译成法语。
/// `class` 为最高分标签在模型中的类别索引。
pub async fn predict_sentiment(registry: &ModelRegistry, text: &str) -> Result<SentimentResult> {
    tracing::info!("Sentiment analysis requested: {}", preview(text));

    let model = registry.sentiment().await?;
    let input = text.to_string();
    let result = run_blocking(move || score_text(model, &input)).await;

    match &result {
        Ok(sentiment) => tracing::info!("Sentiment analysis finished: {}", sentiment.label),
        Err(e) => tracing::error!("Sentiment analysis failed: {}", e),
    }
    result
}

fn score_text(model: Arc<dyn SequenceClassifier>, text: &str) -> Result<SentimentResult> {
    let logits = model.logits(text)?;
    let labels = model.labels();
    if logits.len() != labels.len() {
        return Err(InferenceError::Failed(format!(
            "model returned {} scores for {} labels",
            logits.len(),
            labels.len()
        ))
        .into());
    }
    let scores = activate(&logits, model.activation());
    build_result(labels, &scores)
}

/// 根据得分组装结果
pub fn build_result(labels: &[String], scores: &[f64]) -> Result<SentimentResult> {
    let mut ranked: Vec<(usize, LabelScore)> = labels
        .iter()
        .zip(scores)
        .enumerate()
        .map(|(i, (label, &score))| {
            (
                i,
                LabelScore {
                    label: label.clone(),
                    score,
                },
            )
        })
        .collect();
    // 稳定排序：得分相同时保留模型中的顺序
    ranked.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));

    let (class_id, top) = ranked
        .first()
        .cloned()
        .ok_or_else(|| InferenceError::Failed("model returned no labels".to_string()))?;

    Ok(SentimentResult {
        class_id,
        label: translate_sentiment(&top.label).to_string(),
        probabilities: ranked.iter().map(|(_, p)| p.score).collect(),
        predictions: ranked.into_iter().map(|(_, p)| p).collect(),
    })
}
