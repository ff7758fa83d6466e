pub mod commands;

use crate::api::request::Task;
use clap::{Parser, Subcommand};

/// finsense CLI
#[derive(Parser)]
#[command(name = "finsense")]
#[command(about = "Financial text analysis service: sentiment, entities and relations")]
#[command(version)]
pub struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI 命令
#[derive(Subcommand)]
pub enum Command {
    /// 启动服务器（默认）
    Serve,
    /// 检查模型可用性，仓库模型不可用时以状态 1 退出
    Check,
    /// 对一段文本运行一次预测
    Predict {
        /// 任务：sentiment、ner 或 relation
        #[arg(short, long, default_value = "sentiment")]
        model_type: Task,
        /// 待分析的文本
        #[arg(short, long)]
        text: String,
        /// 关系抽取指令
        #[arg(short, long)]
        instruction: Option<String>,
        /// 同时识别指令中的实体
        #[arg(long)]
        analyze_instruction: bool,
    },
    /// 打印生效的配置
    ShowConfig,
}
