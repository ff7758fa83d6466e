use crate::Result;
use crate::api::error::ConfigError;
use crate::config::defaults::ENV_PREFIX;
use crate::config::settings::Config;
use config::{Config as ConfigBuilder, Environment, File};

/// 以内置默认值为底层的配置构建器
///
/// 文件和环境变量只需覆盖需要修改的字段。
fn base_builder() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>> {
    let defaults = ConfigBuilder::try_from(&Config::default())
        .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
    Ok(ConfigBuilder::builder().add_source(defaults))
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__")
}

/// 从文件加载配置
pub fn load_from_file(path: &str) -> Result<Config> {
    let config = base_builder()?
        .add_source(File::with_name(path))
        .add_source(environment())
        .build()
        .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::Invalid(e.to_string()).into())
}

/// 从环境变量加载配置
pub fn load_from_env() -> Result<Config> {
    let config = base_builder()?
        .add_source(environment())
        .build()
        .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::Invalid(e.to_string()).into())
}
