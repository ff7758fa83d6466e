use crate::api::error::{ApiError, FinsenseError};
use crate::api::request::{PredictRequest, PredictionInput};
use crate::api::response::PredictionResult;
use crate::core::dispatcher::dispatch;
use crate::server::http::server::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

/// 预测端点
///
/// 请求体无法解析时返回 400；缺少文本返回 `Texte manquant`。
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, FinsenseError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    tracing::info!("Predict request for model type: {}", request.model_type());

    let input = PredictionInput::try_from(request)?;
    let result = dispatch(&state.registry, input).await.map_err(|e| {
        tracing::error!("Prediction failed: {}", e);
        e
    })?;
    Ok(Json(result))
}
