use crate::server::http::handlers;
use crate::server::http::server::AppState;
use axum::routing::{get, post};
use axum::Router;

/// 定义路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/models", get(handlers::list_models))
        .route("/api/predict", post(handlers::predict))
        .with_state(state)
}
