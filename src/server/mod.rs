//! 服务入口

pub mod http;

use crate::Result;
use crate::config::Config;
use crate::core::diagnostics;
use crate::core::registry::ModelRegistry;
use crate::storage::FileSystemStorage;
use std::sync::Arc;

/// 启动服务器
///
/// 构建注册表，按配置执行启动检查，然后开始监听。
pub async fn serve(config: Config) -> Result<()> {
    tracing::info!("Starting finsense {}...", crate::VERSION);

    let registry = Arc::new(ModelRegistry::from_config(&config)?);
    if config.server.startup_check {
        let storage = FileSystemStorage::current_dir();
        diagnostics::startup_check(&registry, &storage).await;
    }

    http::serve(&config, registry).await
}
