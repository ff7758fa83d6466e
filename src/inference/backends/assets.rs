//! 模型文件解析
//!
//! 把 [`ModelSource`] 解析为磁盘上的配置、分词器和权重文件。
//! 仓库模型通过 hf-hub 下载到本地缓存，本地模型直接检查目录布局。

use crate::Result;
use crate::api::error::ModelError;
use crate::config::ModelSource;
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
/// 按优先级排列的权重文件名
pub const WEIGHT_FILES: [&str; 2] = ["model.safetensors", "pytorch_model.bin"];

/// 已解析的模型文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    /// 权重是否为 safetensors 格式
    pub fn is_safetensors(&self) -> bool {
        self.weights.extension().and_then(|e| e.to_str()) == Some("safetensors")
    }
}

/// 模型文件解析器
#[derive(Debug, Clone, Default)]
pub struct AssetResolver {
    cache_dir: Option<PathBuf>,
}

impl AssetResolver {
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self { cache_dir }
    }

    /// 解析模型文件
    pub fn resolve(&self, source: &ModelSource) -> Result<ModelFiles> {
        match source {
            ModelSource::Local { path } => resolve_local(path),
            ModelSource::Hub { repo, revision } => self.resolve_hub(repo, revision.as_deref()),
        }
    }

    fn resolve_hub(&self, repo_id: &str, revision: Option<&str>) -> Result<ModelFiles> {
        let mut builder = ApiBuilder::new().with_progress(false);
        if let Some(dir) = &self.cache_dir {
            builder = builder.with_cache_dir(dir.clone());
        }
        let api = builder
            .build()
            .map_err(|e| ModelError::HubUnavailable(format!("{}: {}", repo_id, e)))?;

        let repo = match revision {
            Some(rev) => Repo::with_revision(repo_id.to_string(), RepoType::Model, rev.to_string()),
            None => Repo::model(repo_id.to_string()),
        };
        let repo = api.repo(repo);

        let fetch = |file: &str| {
            repo.get(file)
                .map_err(|e| ModelError::HubUnavailable(format!("{}/{}: {}", repo_id, file, e)))
        };

        let config = fetch(CONFIG_FILE)?;
        let tokenizer = fetch(TOKENIZER_FILE)?;
        let weights = fetch(WEIGHT_FILES[0]).or_else(|_| fetch(WEIGHT_FILES[1]))?;

        tracing::debug!("Resolved hub model {} into {}", repo_id, config.display());
        Ok(ModelFiles {
            config,
            tokenizer,
            weights,
        })
    }
}

/// 检查本地模型目录布局
pub fn resolve_local(path: &Path) -> Result<ModelFiles> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.display().to_string()).into());
    }

    let require = |file: &str| {
        let candidate = path.join(file);
        if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(ModelError::LoadFailed {
                name: path.display().to_string(),
                reason: format!("missing {}", file),
            })
        }
    };

    let config = require(CONFIG_FILE)?;
    let tokenizer = require(TOKENIZER_FILE)?;
    let weights = WEIGHT_FILES
        .iter()
        .map(|file| path.join(file))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ModelError::LoadFailed {
            name: path.display().to_string(),
            reason: format!("missing weights ({})", WEIGHT_FILES.join(" or ")),
        })?;

    Ok(ModelFiles {
        config,
        tokenizer,
        weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::FinsenseError;
    use tempfile::TempDir;

    fn touch(dir: &Path, file: &str) {
        std::fs::write(dir.join(file), b"{}").unwrap();
    }

    #[test]
    fn test_resolve_complete_directory() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), CONFIG_FILE);
        touch(temp_dir.path(), TOKENIZER_FILE);
        touch(temp_dir.path(), "model.safetensors");

        let files = resolve_local(temp_dir.path()).unwrap();
        assert!(files.is_safetensors());
        assert_eq!(files.config, temp_dir.path().join(CONFIG_FILE));
    }

    #[test]
    fn test_resolve_pytorch_weights() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), CONFIG_FILE);
        touch(temp_dir.path(), TOKENIZER_FILE);
        touch(temp_dir.path(), "pytorch_model.bin");

        let files = resolve_local(temp_dir.path()).unwrap();
        assert!(!files.is_safetensors());
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let err = resolve_local(Path::new("/nonexistent/relation-model")).unwrap_err();
        assert!(matches!(err, FinsenseError::Model(ModelError::NotFound(_))));
    }

    #[test]
    fn test_placeholder_directory_fails_to_load() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "README.txt");

        let err = resolve_local(temp_dir.path()).unwrap_err();
        match err {
            FinsenseError::Model(ModelError::LoadFailed { reason, .. }) => {
                assert!(reason.contains(CONFIG_FILE));
            }
            other => panic!("Expected LoadFailed, got {:?}", other),
        }
    }
}
