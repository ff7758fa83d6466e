//! 日志系统
//!
//! 基于 tracing-subscriber 初始化日志，级别、格式和输出目标来自 `[logging]` 配置。
//! 环境变量 `RUST_LOG` 优先于配置中的级别。

use crate::api::error::ConfigError;
use crate::config::LoggingConfig;
use crate::Result;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 日志输出目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogOutput {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "stdout" => LogOutput::Stdout,
            "stderr" => LogOutput::Stderr,
            path => LogOutput::File(PathBuf::from(path)),
        }
    }
}

/// 初始化日志系统
///
/// 只使用第一个输出目标；列出多个时打印警告。
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level);

    let output = config
        .output
        .first()
        .map(|s| LogOutput::parse(s))
        .unwrap_or(LogOutput::Stdout);
    if config.output.len() > 1 {
        // subscriber 尚未初始化，只能直接写 stderr
        eprintln!(
            "Warning: multiple log outputs configured, only {:?} is used",
            output
        );
    }

    match &output {
        LogOutput::Stdout => init_subscriber(&config.format, filter, std::io::stdout)?,
        LogOutput::Stderr => init_subscriber(&config.format, filter, std::io::stderr)?,
        LogOutput::File(path) => {
            let file = open_log_file(path)?;
            init_subscriber(&config.format, filter, file)?
        }
    }

    tracing::info!(
        "Logging initialized: level={}, format={}, output={:?}",
        config.level,
        config.format,
        output
    );
    Ok(())
}

/// `RUST_LOG` 优先，其次是配置级别，无效时回退到 info
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("Warning: invalid log level '{}', using 'info'", level);
            EnvFilter::new("info")
        })
    })
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create log directory: {}", e)))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            ConfigError::Invalid(format!("Failed to open log file {}: {}", path.display(), e))
        })?;
    Ok(file)
}

fn init_subscriber<W>(format: &str, filter: EnvFilter, writer: W) -> Result<()>
where
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = match format.to_lowercase().as_str() {
        "json" => fmt::layer()
            .with_writer(writer)
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .boxed(),
        "pretty" => fmt::layer()
            .with_writer(writer)
            .pretty()
            .with_target(true)
            .with_thread_names(true)
            .boxed(),
        _ => fmt::layer()
            .with_writer(writer)
            .compact()
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| ConfigError::Invalid(format!("Failed to initialize logging: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output() {
        assert_eq!(LogOutput::parse("stdout"), LogOutput::Stdout);
        assert_eq!(LogOutput::parse(" stderr "), LogOutput::Stderr);
        assert_eq!(
            LogOutput::parse("logs/finsense.log"),
            LogOutput::File(PathBuf::from("logs/finsense.log"))
        );
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("finsense.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
