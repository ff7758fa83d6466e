use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::error::Error as StdError;
use thiserror::Error;

/// Finsense 错误类型
#[derive(Debug, Error)]
pub enum FinsenseError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// 模型错误
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("Failed to load model {name}: {reason}")]
    LoadFailed { name: String, reason: String },

    #[error("Unsupported model architecture: {0}")]
    UnsupportedArchitecture(String),

    #[error("Model hub unavailable: {0}")]
    HubUnavailable(String),
}

/// 推理错误
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference failed: {0}")]
    Failed(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Unsupported device: {0}")]
    UnsupportedDevice(String),

    #[error("Inference task aborted: {0}")]
    Aborted(String),
}

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read model file: {0}")]
    ReadFailed(String),

    #[error("Failed to write file: {0}")]
    WriteFailed(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// API 错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 请求中缺少文本，消息保持前端期望的原文
    #[error("Texte manquant")]
    MissingText,

    #[error("Invalid model type: {0}. Choose 'sentiment', 'relation' or 'ner'")]
    InvalidModelType(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl FinsenseError {
    /// 错误对应的 HTTP 状态码
    ///
    /// 校验类错误返回 400，其余（加载、推理、存储等）返回 500。
    pub fn status_code(&self) -> StatusCode {
        match self {
            FinsenseError::Api(ApiError::MissingText)
            | FinsenseError::Api(ApiError::InvalidModelType(_))
            | FinsenseError::Api(ApiError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回给调用方的错误消息
    ///
    /// API 错误直接使用内部消息（不带前缀），例如 `Texte manquant`。
    pub fn client_message(&self) -> String {
        match self {
            FinsenseError::Api(inner) => inner.to_string(),
            other => other.to_string(),
        }
    }

    /// 错误详情：调试表示加上完整的错误链
    pub fn details(&self) -> String {
        let mut details = format!("{:?}", self);
        let mut source = self.source();
        while let Some(cause) = source {
            details.push_str("\nCaused by: ");
            details.push_str(&cause.to_string());
            source = cause.source();
        }
        details
    }
}

impl IntoResponse for FinsenseError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = if status.is_client_error() {
            json!({ "error": self.client_message() })
        } else {
            json!({
                "error": self.client_message(),
                "details": self.details(),
            })
        };

        (status, Json(body)).into_response()
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, FinsenseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_bad_request() {
        let err: FinsenseError = ApiError::MissingText.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "Texte manquant");

        let err: FinsenseError = ApiError::InvalidModelType("summary".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.client_message().contains("'sentiment', 'relation' or 'ner'"));
    }

    #[test]
    fn test_load_errors_are_internal() {
        let err: FinsenseError = ModelError::NotFound("./relation".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.client_message().contains("./relation"));
        assert!(err.details().contains("NotFound"));
    }

    #[test]
    fn test_details_include_cause_chain() {
        let err: FinsenseError = InferenceError::Failed("shape mismatch".to_string()).into();
        let details = err.details();
        assert!(details.starts_with("Inference(Failed"));
        assert!(details.contains("Caused by: Inference failed: shape mismatch"));
    }
}
