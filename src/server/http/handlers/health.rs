use crate::api::response::HealthResponse;
use axum::Json;

/// 健康检查端点
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
        timestamp: chrono::Utc::now(),
    })
}
