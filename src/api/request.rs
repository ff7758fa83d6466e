use crate::api::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 预测请求
///
/// 所有字段都可缺失或为 `null`，缺失的 `text` 由校验逻辑统一处理。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub analyze_instruction: Option<bool>,
}

impl PredictRequest {
    /// 请求的任务名，未指定时为 `sentiment`
    pub fn model_type(&self) -> &str {
        self.model_type.as_deref().unwrap_or(Task::Sentiment.as_str())
    }
}

/// 分析任务
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// 情感分类
    Sentiment,
    /// 命名实体识别
    Ner,
    /// 关系抽取
    Relation,
}

impl Task {
    /// 所有支持的任务
    pub const ALL: [Task; 3] = [Task::Sentiment, Task::Ner, Task::Relation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Sentiment => "sentiment",
            Task::Ner => "ner",
            Task::Relation => "relation",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = ApiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sentiment" => Ok(Task::Sentiment),
            "ner" => Ok(Task::Ner),
            "relation" => Ok(Task::Relation),
            other => Err(ApiError::InvalidModelType(other.to_string())),
        }
    }
}

/// 经过校验的预测输入
#[derive(Debug, Clone)]
pub struct PredictionInput {
    pub text: String,
    pub task: Task,
    pub instruction: Option<String>,
    pub analyze_instruction: bool,
}

impl PredictionInput {
    /// 构造只包含文本和任务的输入
    pub fn new(task: Task, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            task,
            instruction: None,
            analyze_instruction: false,
        }
    }

    /// 附加关系抽取指令
    pub fn with_instruction(mut self, instruction: impl Into<String>, analyze: bool) -> Self {
        self.instruction = Some(instruction.into());
        self.analyze_instruction = analyze;
        self
    }

    /// 非空的指令文本
    pub fn instruction_text(&self) -> Option<&str> {
        self.instruction.as_deref().filter(|s| !s.is_empty())
    }
}

impl TryFrom<PredictRequest> for PredictionInput {
    type Error = crate::api::error::FinsenseError;

    fn try_from(request: PredictRequest) -> Result<Self> {
        let task = request.model_type().parse::<Task>();
        let text = match request.text {
            Some(text) if !text.is_empty() => text,
            _ => return Err(ApiError::MissingText.into()),
        };

        Ok(Self {
            text,
            task: task?,
            instruction: request.instruction,
            analyze_instruction: request.analyze_instruction.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::FinsenseError;

    fn request(json: &str) -> PredictRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults() {
        let req = request(r#"{"text": "Apple beats estimates"}"#);
        assert_eq!(req.model_type(), "sentiment");
        assert!(req.instruction.is_none());

        let input = PredictionInput::try_from(req).unwrap();
        assert_eq!(input.task, Task::Sentiment);
        assert!(!input.analyze_instruction);
    }

    #[test]
    fn test_null_fields_use_defaults() {
        let req = request(
            r#"{"text": "Apple", "model_type": null, "instruction": null, "analyze_instruction": null}"#,
        );
        let input = PredictionInput::try_from(req).unwrap();
        assert_eq!(input.task, Task::Sentiment);
        assert!(input.instruction.is_none());
        assert!(!input.analyze_instruction);
    }

    #[test]
    fn test_null_text_is_missing_text() {
        let err = PredictionInput::try_from(request(r#"{"text": null, "model_type": "ner"}"#)).unwrap_err();
        assert!(matches!(err, FinsenseError::Api(ApiError::MissingText)));
    }

    #[test]
    fn test_missing_text_rejected() {
        let err = PredictionInput::try_from(request(r#"{"model_type": "ner"}"#)).unwrap_err();
        assert!(matches!(err, FinsenseError::Api(ApiError::MissingText)));
    }

    #[test]
    fn test_unknown_model_type_rejected() {
        let err = PredictionInput::try_from(request(r#"{"text": "x", "model_type": "summary"}"#))
            .unwrap_err();
        assert!(matches!(err, FinsenseError::Api(ApiError::InvalidModelType(ref t)) if t == "summary"));
    }

    #[test]
    fn test_task_round_trip() {
        for task in Task::ALL {
            assert_eq!(task.as_str().parse::<Task>().unwrap(), task);
        }
    }

    #[test]
    fn test_blank_instruction_is_ignored() {
        let input = PredictionInput::new(Task::Relation, "text").with_instruction("", true);
        assert!(input.instruction_text().is_none());
    }
}
