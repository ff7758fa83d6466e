//! 命名实体识别

use crate::Result;
use crate::api::response::{NerEntity, NerResult};
use crate::core::registry::ModelRegistry;
use crate::inference::scores::finite;
use crate::inference::{run_blocking, RawEntity};
use crate::models::labels::translate_entity_group;
use crate::predictors::preview;
use std::collections::BTreeMap;

/// 命名实体识别
///
/// 为每个实体附加法语类型名称，并统计各类型的数量。
pub async fn predict_ner(registry: &ModelRegistry, text: &str) -> Result<NerResult> {
    tracing::info!("Entity recognition requested: {}", preview(text));

    let raw = extract_entities(registry, text).await.map_err(|e| {
        tracing::error!("Entity recognition failed: {}", e);
        e
    })?;
    let result = build_result(raw, text);

    tracing::info!(
        "Entity recognition finished: {} entities found",
        result.entities.len()
    );
    Ok(result)
}

/// 运行 NER 模型，返回未翻译的实体
pub async fn extract_entities(registry: &ModelRegistry, text: &str) -> Result<Vec<RawEntity>> {
    let model = registry.ner().await?;
    let input = text.to_string();
    run_blocking(move || model.entities(&input)).await
}

/// 翻译实体类型并统计
pub fn build_result(raw: Vec<RawEntity>, text: &str) -> NerResult {
    let entities: Vec<NerEntity> = raw.into_iter().map(to_entity).collect();

    let mut entity_stats = BTreeMap::new();
    for entity in &entities {
        *entity_stats.entry(entity.entity_group.clone()).or_insert(0) += 1;
    }

    NerResult {
        entities,
        entity_stats,
        text: text.to_string(),
    }
}

fn to_entity(raw: RawEntity) -> NerEntity {
    NerEntity {
        entity_group_fr: translate_entity_group(&raw.entity_group).to_string(),
        entity_group: raw.entity_group,
        score: finite(raw.score as f64),
        start: raw.start,
        end: raw.end,
        word: raw.word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::predictors::testing::default_loader;
    use std::sync::Arc;

    fn raw(group: &str, start: usize, end: usize, word: &str) -> RawEntity {
        RawEntity {
            entity_group: group.to_string(),
            score: 0.75,
            start,
            end,
            word: word.to_string(),
        }
    }

    #[test]
    fn test_translation_and_stats() {
        let result = build_result(
            vec![
                raw("CORP", 0, 5, "apple"),
                raw("MONEY", 15, 26, "10 millions"),
                raw("CORP", 30, 37, "tesla"),
                raw("TICKER", 40, 44, "aapl"),
            ],
            "Apple a gagné 10 millions, Tesla, AAPL",
        );

        assert_eq!(result.entities[0].entity_group_fr, "Entreprise");
        assert_eq!(result.entities[1].entity_group_fr, "Montant");
        assert_eq!(result.entities[3].entity_group_fr, "TICKER");
        assert_eq!(result.entity_stats["CORP"], 2);
        assert_eq!(result.entity_stats["MONEY"], 1);
        assert_eq!(result.entity_stats.values().sum::<usize>(), result.entities.len());
    }

    #[test]
    fn test_no_entities() {
        let result = build_result(vec![], "rien");
        assert!(result.entities.is_empty());
        assert!(result.entity_stats.is_empty());
        assert_eq!(result.text, "rien");
    }

    #[test]
    fn test_nan_score_coerced() {
        let mut entity = raw("DATE", 0, 4, "2023");
        entity.score = f32::NAN;
        let result = build_result(vec![entity], "2023");
        assert_eq!(result.entities[0].score, 0.0);
    }

    #[tokio::test]
    async fn test_predict_ner() {
        let registry = ModelRegistry::new(Config::default().models, Arc::new(default_loader()));

        let result = predict_ner(&registry, "Apple a gagné 10 millions de dollars en 2023.").await.unwrap();
        assert_eq!(result.entities.len(), 2);
        assert_eq!(result.entities[0].entity_group, "CORP");
        assert_eq!(result.entities[1].entity_group_fr, "Date");
        assert_eq!(result.entity_stats.values().sum::<usize>(), 2);
    }
}
