//! finsense - 金融文本分析服务
//!
//! 提供情感分类、命名实体识别和关系抽取三种分析，
//! 模型推理基于 candle，HTTP 接口基于 axum。

#![warn(clippy::all)]

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod inference;
pub mod models;
pub mod predictors;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use crate::api::error::{FinsenseError, Result};
pub use crate::config::Config;

/// finsense version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
