//! 请求分发
//!
//! 把经过校验的 [`PredictionInput`] 路由到对应的预测器。

use crate::Result;
use crate::api::error::ApiError;
use crate::api::request::{PredictionInput, Task};
use crate::api::response::PredictionResult;
use crate::core::registry::ModelRegistry;
use crate::predictors::{predict_ner, predict_relation, predict_sentiment};

/// 执行一次预测
///
/// 关系抽取且 `analyze_instruction` 为真时，额外对指令文本运行 NER，
/// 结果放入 `instruction_entities`；这一步失败只记录日志，不影响主结果。
pub async fn dispatch(registry: &ModelRegistry, input: PredictionInput) -> Result<PredictionResult> {
    if input.text.is_empty() {
        return Err(ApiError::MissingText.into());
    }

    tracing::debug!("Dispatching {} request", input.task);
    let result: PredictionResult = match input.task {
        Task::Sentiment => predict_sentiment(registry, &input.text).await?.into(),
        Task::Ner => predict_ner(registry, &input.text).await?.into(),
        Task::Relation => {
            let instruction = input.instruction_text();
            let mut result = predict_relation(registry, &input.text, instruction).await?;

            if input.analyze_instruction {
                if let Some(instruction) = instruction {
                    match predict_ner(registry, instruction).await {
                        Ok(ner) => result.instruction_entities = Some(ner.entities),
                        Err(e) => {
                            tracing::error!("Instruction analysis failed: {}", e);
                        }
                    }
                }
            }
            result.into()
        }
    };

    Ok(result)
}
