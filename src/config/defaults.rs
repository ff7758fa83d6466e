// 默认配置常量

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

pub const DEFAULT_SENTIMENT_MODEL: &str = "Wilbiz/financial-sentiment";
pub const DEFAULT_NER_MODEL: &str = "Wilbiz/financial-ner";
pub const DEFAULT_RELATION_MODEL_PATH: &str =
    "./Fine-tuned-Bert-base-uncased-lora-financial-Relation-Extraction-cls";
pub const DEFAULT_SENTIMENT_MODEL_PATH: &str =
    "./Fine-tuned-model_Bert-base-uncased-110M-sentiment_analysis";

pub const DEFAULT_DEVICE: &str = "cpu";
pub const DEFAULT_MAX_LENGTH: usize = 512;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FORMAT: &str = "pretty";

/// 环境变量前缀，例如 `FINSENSE_SERVER__PORT`
pub const ENV_PREFIX: &str = "FINSENSE";
