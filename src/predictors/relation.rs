//! 关系抽取

use crate::Result;
use crate::api::error::InferenceError;
use crate::api::response::{RelationEntity, RelationResult};
use crate::core::registry::ModelRegistry;
use crate::inference::scores::{argmax, finite, softmax};
use crate::inference::{run_blocking, RawEntity};
use crate::models::labels::{relation_label, RELATION_CLASS_COUNT};
use crate::predictors::ner::extract_entities;
use crate::predictors::preview;

/// 未提供指令时使用的默认指令
pub const DEFAULT_INSTRUCTION: &str =
    "Utilize the input text as a context reference, choose the right relationship between";

/// 组装模型输入：指令、空行、方括号包裹的文本
pub fn build_prompt(text: &str, instruction: Option<&str>) -> String {
    let instruction = instruction
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_INSTRUCTION);
    format!("{}\n\n[{}]", instruction, text)
}

/// 关系抽取
///
/// 同时对原文运行 NER 以标注候选实体；NER 失败只记录警告，`entities` 为空。
pub async fn predict_relation(
    registry: &ModelRegistry,
    text: &str,
    instruction: Option<&str>,
) -> Result<RelationResult> {
    tracing::info!("Relation extraction requested: {}", preview(text));

    let model = registry.relation().await.map_err(|e| {
        tracing::error!("Relation extraction failed: {}", e);
        e
    })?;
    let prompt = build_prompt(text, instruction);
    let logits = run_blocking(move || model.logits(&prompt)).await?;
    let (class_id, probabilities) = classify(&logits)?;
    let label = relation_label(class_id);
    if class_id >= RELATION_CLASS_COUNT {
        tracing::warn!("Predicted class {} is not in the relation table", class_id);
    }

    let entities = match extract_entities(registry, text).await {
        Ok(raw) => {
            tracing::info!("Entities extracted for relation: {}", raw.len());
            raw.into_iter().map(to_relation_entity).collect()
        }
        Err(e) => {
            tracing::warn!("Unable to extract entities for relation: {}", e);
            Vec::new()
        }
    };

    tracing::info!("Relation extraction finished: {}", label);
    Ok(RelationResult {
        class_id,
        label,
        probabilities,
        entities,
        text: text.to_string(),
        instruction_entities: None,
    })
}

/// 预测类别及 softmax 概率
fn classify(logits: &[f32]) -> Result<(usize, Vec<f64>)> {
    let class_id = argmax(logits)
        .ok_or_else(|| InferenceError::Failed("relation model returned no scores".to_string()))?;
    Ok((class_id, softmax(logits)))
}

fn to_relation_entity(raw: RawEntity) -> RelationEntity {
    RelationEntity {
        entity_type: raw.entity_group,
        text: raw.word,
        start: raw.start,
        end: raw.end,
        score: finite(raw.score as f64),
    }
}
