use crate::Result;
use crate::api::error::ApiError;
use crate::config::Config;
use crate::core::registry::ModelRegistry;
use crate::server::http::routes;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// 处理函数共享的状态
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }
}

/// 组装路由和中间件
pub fn build_app(state: AppState, cors: bool) -> axum::Router {
    let app = routes::create_router(state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
    if cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// 启动 HTTP 服务器
pub async fn serve(config: &Config, registry: Arc<ModelRegistry>) -> Result<()> {
    let app = build_app(AppState::new(registry), config.server.cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
