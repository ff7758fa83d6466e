use crate::config::defaults::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 主配置结构
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub inference: InferenceConfig,
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 是否启用宽松的 CORS
    pub cors: bool,
    /// 启动时探测模型并创建占位目录
    pub startup_check: bool,
}

/// 模型来源
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum ModelSource {
    /// 模型仓库中的模型
    Hub {
        repo: String,
        #[serde(default)]
        revision: Option<String>,
    },
    /// 本地目录中的模型
    Local { path: PathBuf },
}

impl ModelSource {
    pub fn hub(repo: impl Into<String>) -> Self {
        ModelSource::Hub {
            repo: repo.into(),
            revision: None,
        }
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        ModelSource::Local { path: path.into() }
    }

    /// 本地目录（仓库模型返回 `None`）
    pub fn local_path(&self) -> Option<&PathBuf> {
        match self {
            ModelSource::Local { path } => Some(path),
            ModelSource::Hub { .. } => None,
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Hub { repo, revision: Some(rev) } => write!(f, "{}@{}", repo, rev),
            ModelSource::Hub { repo, revision: None } => f.write_str(repo),
            ModelSource::Local { path } => write!(f, "{}", path.display()),
        }
    }
}

/// 模型配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelsConfig {
    /// 本地情感模型目录，仅用于诊断和占位
    pub sentiment_local_path: PathBuf,
    /// 本地模型目录缺失时创建占位目录
    pub create_placeholders: bool,
    /// 模型仓库缓存目录（默认使用 hf-hub 的缓存位置）
    pub hub_cache_dir: Option<PathBuf>,
    pub sentiment: ModelSource,
    pub ner: ModelSource,
    pub relation: ModelSource,
}

impl ModelsConfig {
    /// 需要在磁盘上存在的本地模型目录
    pub fn local_models(&self) -> Vec<(&'static str, PathBuf)> {
        let mut models = vec![("Sentiment Analysis", self.sentiment_local_path.clone())];
        if let Some(path) = self.relation.local_path() {
            models.push(("Relation Extraction", path.clone()));
        }
        models
    }
}

/// 推理配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InferenceConfig {
    /// 计算设备：`cpu`、`cuda`、`cuda:N` 或 `metal`
    pub device: String,
    /// 分词后的最大长度
    pub max_length: usize,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
                cors: true,
                startup_check: true,
            },
            models: ModelsConfig {
                sentiment_local_path: PathBuf::from(DEFAULT_SENTIMENT_MODEL_PATH),
                create_placeholders: true,
                hub_cache_dir: None,
                sentiment: ModelSource::hub(DEFAULT_SENTIMENT_MODEL),
                ner: ModelSource::hub(DEFAULT_NER_MODEL),
                relation: ModelSource::local(DEFAULT_RELATION_MODEL_PATH),
            },
            inference: InferenceConfig {
                device: DEFAULT_DEVICE.to_string(),
                max_length: DEFAULT_MAX_LENGTH,
            },
            logging: LoggingConfig {
                level: DEFAULT_LOG_LEVEL.to_string(),
                format: DEFAULT_LOG_FORMAT.to_string(),
                output: vec!["stdout".to_string()],
            },
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &str) -> crate::Result<Self> {
        crate::config::loader::load_from_file(path)
    }

    /// 从环境变量加载配置
    pub fn from_env() -> crate::Result<Self> {
        crate::config::loader::load_from_env()
    }

    /// 指定文件时从文件加载，否则只叠加环境变量
    pub fn load(path: Option<&str>) -> crate::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    /// 序列化为 TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::api::error::ConfigError::Invalid(e.to_string()).into())
    }
}
