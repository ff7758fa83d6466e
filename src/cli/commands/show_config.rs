use crate::Result;
use crate::config::Config;

/// 以 TOML 打印生效的配置
pub fn show_config(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
