use crate::api::response::ModelInfo;
use crate::server::http::server::AppState;
use axum::extract::State;
use axum::Json;

/// 列出配置的模型及加载状态
pub async fn list_models(State(state): State<AppState>) -> Json<Vec<ModelInfo>> {
    Json(state.registry.list().await)
}
