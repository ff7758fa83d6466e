//! 模型注册表
//!
//! 进程级的模型能力注册表，启动时构建一次，通过 axum state 传给各处理函数。
//! 管理三类能力：情感分类、NER、关系抽取。

use crate::Result;
use crate::api::error::ModelError;
use crate::api::request::Task;
use crate::api::response::ModelInfo;
use crate::config::{Config, ModelSource, ModelsConfig};
use crate::core::cache::ModelCache;
use crate::inference::backends::CandleLoader;
use crate::inference::{run_blocking, ModelLoader, SequenceClassifier, TokenClassifier};
use crate::models::labels::RELATION_CLASS_COUNT;
use std::path::Path;
use std::sync::Arc;

/// 情感模型的缓存键
pub const SENTIMENT_KEY: &str = "sentiment_pipeline";
/// NER 模型的缓存键
pub const NER_KEY: &str = "ner_pipeline";

/// 关系模型的缓存键（按来源区分）
pub fn relation_key(source: &ModelSource) -> String {
    format!("model_{}", source)
}

/// 模型注册表
pub struct ModelRegistry {
    loader: Arc<dyn ModelLoader>,
    sources: ModelsConfig,
    classifiers: ModelCache<dyn SequenceClassifier>,
    taggers: ModelCache<dyn TokenClassifier>,
}

impl ModelRegistry {
    /// 创建新的模型注册表
    pub fn new(sources: ModelsConfig, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            sources,
            classifiers: ModelCache::new(),
            taggers: ModelCache::new(),
        }
    }

    /// 使用 Candle 后端创建
    pub fn from_config(config: &Config) -> Result<Self> {
        let loader = CandleLoader::from_config(config)?;
        Ok(Self::new(config.models.clone(), Arc::new(loader)))
    }

    /// 模型来源配置
    pub fn sources(&self) -> &ModelsConfig {
        &self.sources
    }

    /// 情感分类模型
    pub async fn sentiment(&self) -> Result<Arc<dyn SequenceClassifier>> {
        let loader = self.loader.clone();
        let source = self.sources.sentiment.clone();
        self.classifiers
            .get_or_load(SENTIMENT_KEY, || async move {
                run_blocking(move || loader.load_sequence_classifier(&source, None)).await
            })
            .await
    }

    /// NER 模型
    pub async fn ner(&self) -> Result<Arc<dyn TokenClassifier>> {
        let loader = self.loader.clone();
        let source = self.sources.ner.clone();
        self.taggers
            .get_or_load(NER_KEY, || async move {
                run_blocking(move || loader.load_token_classifier(&source)).await
            })
            .await
    }

    /// 关系抽取模型（固定 29 类）
    ///
    /// 本地模型目录不存在时返回 `ModelError::NotFound`，不会尝试加载。
    pub async fn relation(&self) -> Result<Arc<dyn SequenceClassifier>> {
        let source = self.sources.relation.clone();
        if let Some(path) = source.local_path() {
            ensure_exists(path).await?;
        }

        let loader = self.loader.clone();
        let key = relation_key(&source);
        self.classifiers
            .get_or_load(&key, || async move {
                run_blocking(move || {
                    loader.load_sequence_classifier(&source, Some(RELATION_CLASS_COUNT))
                })
                .await
            })
            .await
    }

    /// 尝试加载本地序列分类模型，不写入缓存
    ///
    /// `relation` 为真时按固定 29 类加载，否则使用 config.json 中的标签。
    pub async fn try_load_local(&self, path: &Path, relation: bool) -> Result<()> {
        let num_labels = relation.then_some(RELATION_CLASS_COUNT);
        let loader = self.loader.clone();
        let source = ModelSource::local(path);
        run_blocking(move || loader.load_sequence_classifier(&source, num_labels).map(|_| ())).await
    }

    /// 已加载模型的缓存键
    pub async fn loaded_models(&self) -> Vec<String> {
        let mut keys = self.classifiers.keys().await;
        keys.extend(self.taggers.keys().await);
        keys.sort();
        keys
    }

    /// 配置的模型及其加载状态
    pub async fn list(&self) -> Vec<ModelInfo> {
        let entries = [
            (Task::Sentiment, &self.sources.sentiment, SENTIMENT_KEY.to_string()),
            (Task::Ner, &self.sources.ner, NER_KEY.to_string()),
            (Task::Relation, &self.sources.relation, relation_key(&self.sources.relation)),
        ];

        let mut models = Vec::with_capacity(entries.len());
        for (task, source, key) in entries {
            let loaded = match task {
                Task::Ner => self.taggers.is_loaded(&key).await,
                Task::Sentiment | Task::Relation => self.classifiers.is_loaded(&key).await,
            };
            models.push(ModelInfo {
                task: task.to_string(),
                source: source.to_string(),
                cache_key: key,
                loaded,
            });
        }
        models
    }
}

async fn ensure_exists(path: &Path) -> Result<()> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => Ok(()),
        _ => Err(ModelError::NotFound(format!(
            "relation extraction model does not exist: {}",
            path.display()
        ))
        .into()),
    }
}
