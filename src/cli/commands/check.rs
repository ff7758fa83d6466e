use crate::Result;
use crate::config::Config;
use crate::core::diagnostics::{run_check, CheckReport};
use crate::core::registry::ModelRegistry;
use crate::storage::FileSystemStorage;

/// 检查模型可用性并创建占位目录
///
/// 返回报告，由调用方根据 [`CheckReport::hub_ok`] 决定退出码。
pub async fn check(config: &Config) -> Result<CheckReport> {
    let registry = ModelRegistry::from_config(config)?;
    let storage = FileSystemStorage::current_dir();
    let report = run_check(&registry, &storage).await?;

    for probe in &report.hub {
        let status = if probe.ok { "ok" } else { "FAILED" };
        println!("[{}] {} ({}): {}", status, probe.task, probe.source, probe.message);
    }
    for model in &report.local {
        println!("[{:?}] {} ({})", model.state, model.name, model.path.display());
    }
    for path in &report.placeholders {
        println!("[created] placeholder {}", path.display());
    }
    Ok(report)
}
