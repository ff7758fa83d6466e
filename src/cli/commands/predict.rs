use crate::Result;
use crate::api::error::ApiError;
use crate::api::request::{PredictionInput, Task};
use crate::config::Config;
use crate::core::dispatcher::dispatch;
use crate::core::registry::ModelRegistry;

/// 对一段文本运行一次预测，并以 JSON 打印结果
pub async fn predict(
    config: &Config,
    task: Task,
    text: &str,
    instruction: Option<String>,
    analyze_instruction: bool,
) -> Result<()> {
    let registry = ModelRegistry::from_config(config)?;

    let mut input = PredictionInput::new(task, text);
    if let Some(instruction) = instruction {
        input = input.with_instruction(instruction, analyze_instruction);
    }

    let result = dispatch(&registry, input).await?;
    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize result: {}", e)))?;
    println!("{}", json);
    Ok(())
}
