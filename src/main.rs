use clap::Parser;
use finsense::cli::{commands, Cli, Command};
use finsense::config::Config;
use finsense::utils::logging::init_logging;
use finsense::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();

    // 默认值 < 配置文件 < FINSENSE_* 环境变量
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    // 未指定命令时默认启动服务器
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => commands::serve(config).await?,
        Command::Check => {
            let report = commands::check(&config).await?;
            if !report.hub_ok() {
                std::process::exit(1);
            }
        }
        Command::Predict {
            model_type,
            text,
            instruction,
            analyze_instruction,
        } => commands::predict(&config, model_type, &text, instruction, analyze_instruction).await?,
        Command::ShowConfig => commands::show_config(&config)?,
    }

    Ok(())
}
