//! 启动诊断
//!
//! 探测仓库模型能否加载并完成一次推理，检查本地模型目录，必要时创建占位目录。
//! 探测经过注册表进行，成功的探测同时预热了模型缓存。

use crate::Result;
use crate::api::request::Task;
use crate::core::registry::ModelRegistry;
use crate::predictors::{predict_ner, predict_sentiment};
use crate::storage::{LocalModelInfo, LocalModelState, Storage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// 情感模型的探测句子
pub const SENTIMENT_PROBE: &str = "Apple a annoncé des résultats financiers positifs.";
/// NER 模型的探测句子
pub const NER_PROBE: &str = "Apple a gagné 10 millions de dollars en 2023.";

/// 单个模型的探测结果
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub task: Task,
    pub source: String,
    pub ok: bool,
    pub message: String,
}

/// 诊断报告
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub checked_at: DateTime<Utc>,
    pub hub: Vec<ProbeResult>,
    pub local: Vec<LocalModelInfo>,
    pub placeholders: Vec<PathBuf>,
}

impl CheckReport {
    /// 仓库模型是否全部可用
    pub fn hub_ok(&self) -> bool {
        self.hub.iter().all(|probe| probe.ok)
    }
}

/// 加载情感与 NER 模型并各运行一次探测句子
pub async fn check_hub_models(registry: &ModelRegistry) -> Vec<ProbeResult> {
    tracing::info!("Checking hub models...");
    let sources = registry.sources();

    let sentiment = match predict_sentiment(registry, SENTIMENT_PROBE).await {
        Ok(result) => Ok(format!("{} ({})", result.label, result.predictions.len())),
        Err(e) => Err(e),
    };
    let ner = match predict_ner(registry, NER_PROBE).await {
        Ok(result) => Ok(format!("{} entities", result.entities.len())),
        Err(e) => Err(e),
    };

    vec![
        probe_result(Task::Sentiment, sources.sentiment.to_string(), sentiment),
        probe_result(Task::Ner, sources.ner.to_string(), ner),
    ]
}

fn probe_result(task: Task, source: String, outcome: Result<String>) -> ProbeResult {
    match outcome {
        Ok(summary) => {
            tracing::info!("Model {} ({}) tested successfully: {}", task, source, summary);
            ProbeResult {
                task,
                source,
                ok: true,
                message: summary,
            }
        }
        Err(e) => {
            tracing::error!("Model {} ({}) is unavailable: {}", task, source, e);
            ProbeResult {
                task,
                source,
                ok: false,
                message: e.to_string(),
            }
        }
    }
}

/// 检查配置中的本地模型目录
///
/// 文件齐全的目录会实际加载一次，加载失败时状态为 `LoadFailed`。
pub async fn check_local_models(
    registry: &ModelRegistry,
    storage: &dyn Storage,
) -> Result<Vec<LocalModelInfo>> {
    tracing::info!("Checking local models...");
    let mut models = Vec::new();
    for (name, path) in registry.sources().local_models() {
        let mut info = storage.inspect(name, &path).await?;
        match info.state {
            LocalModelState::Ready => {
                tracing::info!("Trying to load local model {}...", name);
                let relation = registry.sources().relation.local_path() == Some(&path);
                match registry.try_load_local(&storage.resolve(&path), relation).await {
                    Ok(()) => tracing::info!("Local model {} loaded successfully", name),
                    Err(e) => {
                        tracing::error!("Failed to load local model {}: {}", name, e);
                        info.state = LocalModelState::LoadFailed;
                        info.load_error = Some(e.to_string());
                    }
                }
            }
            LocalModelState::Missing => {
                tracing::error!("Model {} does not exist at path: {}", name, path.display())
            }
            LocalModelState::Placeholder
            | LocalModelState::Incomplete
            | LocalModelState::LoadFailed => tracing::warn!(
                "Model {} at {} is {:?} and cannot be loaded",
                name,
                path.display(),
                info.state
            ),
        }
        models.push(info);
    }
    Ok(models)
}

/// 为缺失的本地模型目录创建占位目录，返回新建的路径
pub async fn create_placeholders(
    registry: &ModelRegistry,
    storage: &dyn Storage,
) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    for (name, path) in registry.sources().local_models() {
        if storage.ensure_placeholder(name, &path).await? {
            created.push(path);
        }
    }
    Ok(created)
}

/// 完整诊断：仓库模型、本地模型、占位目录
pub async fn run_check(registry: &ModelRegistry, storage: &dyn Storage) -> Result<CheckReport> {
    tracing::info!("Starting model verification...");
    let hub = check_hub_models(registry).await;
    let local = check_local_models(registry, storage).await?;
    let placeholders = if registry.sources().create_placeholders {
        create_placeholders(registry, storage).await?
    } else {
        Vec::new()
    };

    let report = CheckReport {
        checked_at: Utc::now(),
        hub,
        local,
        placeholders,
    };
    if report.hub_ok() {
        tracing::info!("All hub models are available");
    } else {
        tracing::error!("Some hub models are unavailable");
    }
    Ok(report)
}

/// 服务启动前的检查，所有失败只记录日志
pub async fn startup_check(registry: &ModelRegistry, storage: &dyn Storage) {
    tracing::info!("Checking configuration at startup...");

    let probes = check_hub_models(registry).await;
    if probes.iter().any(|probe| !probe.ok) {
        tracing::warn!("Continuing startup without all hub models");
    }

    if registry.sources().create_placeholders {
        if let Err(e) = create_placeholders(registry, storage).await {
            tracing::error!("Failed to create model placeholders: {}", e);
        }
    }

    tracing::info!("Startup check finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ModelSource, ModelsConfig};
    use crate::predictors::testing::default_loader;
    use crate::storage::FileSystemStorage;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn models() -> ModelsConfig {
        let mut models = Config::default().models;
        models.sentiment_local_path = PathBuf::from("sentiment-local");
        models.relation = ModelSource::local("relation-local");
        models
    }

    #[tokio::test]
    async fn test_run_check_creates_placeholders() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(temp_dir.path());
        let registry = ModelRegistry::new(models(), Arc::new(default_loader()));

        let report = run_check(&registry, &storage).await.unwrap();
        assert!(report.hub_ok());
        assert_eq!(report.hub.len(), 2);
        assert!(report.local.iter().all(|m| m.state == LocalModelState::Missing));
        assert_eq!(report.placeholders.len(), 2);
        assert!(temp_dir.path().join("relation-local").join("README.txt").exists());

        // 探测已经预热缓存
        assert_eq!(registry.loaded_models().await.len(), 2);
    }

    /// 记录加载参数，序列分类模型总是加载失败
    #[derive(Default)]
    struct RejectingLoader {
        requested: std::sync::Mutex<Vec<(String, Option<usize>)>>,
    }

    impl crate::inference::ModelLoader for RejectingLoader {
        fn load_sequence_classifier(
            &self,
            source: &ModelSource,
            num_labels: Option<usize>,
        ) -> Result<Arc<dyn crate::inference::SequenceClassifier>> {
            self.requested.lock().unwrap().push((source.to_string(), num_labels));
            Err(crate::api::error::ModelError::LoadFailed {
                name: source.to_string(),
                reason: "corrupt weights".to_string(),
            }
            .into())
        }

        fn load_token_classifier(
            &self,
            source: &ModelSource,
        ) -> Result<Arc<dyn crate::inference::TokenClassifier>> {
            Err(crate::api::error::ModelError::HubUnavailable(source.to_string()).into())
        }
    }

    fn write_model_files(dir: &std::path::Path) {
        std::fs::create_dir_all(dir).unwrap();
        for file in ["config.json", "tokenizer.json", "model.safetensors"] {
            std::fs::write(dir.join(file), b"{}").unwrap();
        }
    }

    #[tokio::test]
    async fn test_complete_local_model_is_loaded() {
        let temp_dir = TempDir::new().unwrap();
        write_model_files(&temp_dir.path().join("relation-local"));
        let storage = FileSystemStorage::new(temp_dir.path());
        let registry = ModelRegistry::new(models(), Arc::new(default_loader()));

        let local = check_local_models(&registry, &storage).await.unwrap();
        let relation = local.iter().find(|m| m.name == "Relation Extraction").unwrap();
        assert_eq!(relation.state, LocalModelState::Ready);
        assert!(relation.load_error.is_none());
        // 检查加载不写入缓存
        assert!(registry.loaded_models().await.is_empty());
    }

    #[tokio::test]
    async fn test_local_load_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        write_model_files(&temp_dir.path().join("relation-local"));
        write_model_files(&temp_dir.path().join("sentiment-local"));
        let storage = FileSystemStorage::new(temp_dir.path());
        let loader = Arc::new(RejectingLoader::default());
        let registry = ModelRegistry::new(models(), loader.clone());

        let local = check_local_models(&registry, &storage).await.unwrap();
        assert!(local.iter().all(|m| m.state == LocalModelState::LoadFailed));
        let relation = local.iter().find(|m| m.name == "Relation Extraction").unwrap();
        assert!(relation.load_error.as_deref().unwrap().contains("corrupt weights"));

        let requested = loader.requested.lock().unwrap();
        assert_eq!(requested.len(), 2);
        let relation_dir = temp_dir.path().join("relation-local").display().to_string();
        assert!(requested.contains(&(relation_dir, Some(crate::models::labels::RELATION_CLASS_COUNT))));
        assert!(requested.iter().any(|(_, labels)| labels.is_none()));
    }

    #[tokio::test]
    async fn test_hub_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(temp_dir.path());
        let mut loader = default_loader();
        loader.tagger = None;
        let registry = ModelRegistry::new(models(), Arc::new(loader));

        let report = run_check(&registry, &storage).await.unwrap();
        assert!(!report.hub_ok());
        let ner = report.hub.iter().find(|p| p.task == Task::Ner).unwrap();
        assert!(!ner.ok);
        assert!(ner.message.contains("Wilbiz/financial-ner"));
    }

    #[tokio::test]
    async fn test_placeholders_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(temp_dir.path());
        let mut sources = models();
        sources.create_placeholders = false;
        let registry = ModelRegistry::new(sources, Arc::new(default_loader()));

        startup_check(&registry, &storage).await;
        assert!(!temp_dir.path().join("relation-local").exists());
    }
}
