use crate::Result;
use crate::config::Config;

/// 启动服务器
pub async fn serve(config: Config) -> Result<()> {
    tracing::info!("Starting finsense server on {}:{}", config.server.host, config.server.port);
    crate::server::serve(config).await
}
