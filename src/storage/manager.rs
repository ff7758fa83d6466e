//! 本地模型存储
//!
//! 检查本地模型目录的状态，并在目录缺失时创建占位目录。

use crate::Result;
use crate::api::error::StorageError;
use crate::inference::backends::assets::{CONFIG_FILE, TOKENIZER_FILE, WEIGHT_FILES};
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 占位目录中的说明文件
pub const PLACEHOLDER_FILE: &str = "README.txt";

/// 存储 trait - 本地模型目录的统一接口
#[async_trait]
pub trait Storage: Send + Sync {
    /// 检查模型目录是否存在
    async fn model_exists(&self, path: &Path) -> bool;

    /// 检查模型目录的状态
    async fn inspect(&self, name: &str, path: &Path) -> Result<LocalModelInfo>;

    /// 目录缺失时创建占位目录，返回是否新建
    async fn ensure_placeholder(&self, name: &str, path: &Path) -> Result<bool>;

    /// 解析模型目录在磁盘上的实际位置
    fn resolve(&self, path: &Path) -> PathBuf;
}

/// 本地模型目录状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalModelState {
    /// 目录不存在
    Missing,
    /// 只有占位文件
    Placeholder,
    /// 目录存在但缺少模型文件
    Incomplete,
    /// 配置、分词器和权重齐全
    Ready,
    /// 文件齐全但加载失败（由诊断检查设置）
    LoadFailed,
}

/// 本地模型信息
#[derive(Debug, Clone, Serialize)]
pub struct LocalModelInfo {
    pub name: String,
    pub path: PathBuf,
    pub state: LocalModelState,
    pub size: u64,
    pub format: Option<String>,
    /// 加载失败的原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

/// 文件系统存储实现
///
/// 相对路径基于 `base_path` 解析。
pub struct FileSystemStorage {
    base_path: PathBuf,
}

impl FileSystemStorage {
    /// 创建新的文件系统存储
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// 基于当前工作目录
    pub fn current_dir() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl Storage for FileSystemStorage {
    async fn model_exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }

    async fn inspect(&self, name: &str, path: &Path) -> Result<LocalModelInfo> {
        let dir = self.resolve(path);
        let mut info = LocalModelInfo {
            name: name.to_string(),
            path: path.to_path_buf(),
            state: LocalModelState::Missing,
            size: 0,
            format: None,
            load_error: None,
        };
        if !self.model_exists(path).await {
            return Ok(info);
        }

        let files = list_files(&dir).await?;
        info.size = files.iter().map(|(_, len)| len).sum();
        info.format = WEIGHT_FILES
            .iter()
            .find(|weight| has_file(&files, weight))
            .and_then(|weight| Path::new(weight).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_string());

        info.state = if has_file(&files, CONFIG_FILE)
            && has_file(&files, TOKENIZER_FILE)
            && info.format.is_some()
        {
            LocalModelState::Ready
        } else if files.len() == 1 && has_file(&files, PLACEHOLDER_FILE) {
            LocalModelState::Placeholder
        } else {
            LocalModelState::Incomplete
        };
        Ok(info)
    }

    async fn ensure_placeholder(&self, name: &str, path: &Path) -> Result<bool> {
        if self.model_exists(path).await {
            return Ok(false);
        }

        let dir = self.resolve(path);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        tokio::fs::write(dir.join(PLACEHOLDER_FILE), placeholder_text(name))
            .await
            .map_err(|e| {
                StorageError::WriteFailed(format!("Failed to write placeholder for {}: {}", name, e))
            })?;

        tracing::info!("Created placeholder for model {} at {}", name, dir.display());
        Ok(true)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

fn placeholder_text(name: &str) -> String {
    format!(
        "Placeholder pour le modèle {}.\n\
         Ce fichier a été créé automatiquement par finsense.\n\
         Ce dossier est un placeholder pour permettre à l'application de fonctionner sans erreur.\n",
        name
    )
}

fn has_file(files: &[(String, u64)], name: &str) -> bool {
    files.iter().any(|(file, _)| file == name)
}

/// 目录下的文件名及大小（不递归）
async fn list_files(dir: &Path) -> Result<Vec<(String, u64)>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        StorageError::ReadFailed(format!("Failed to read {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StorageError::ReadFailed(format!("Failed to read directory entry: {}", e)))?
    {
        let metadata = entry
            .metadata()
            .await
            .map_err(|e| StorageError::ReadFailed(format!("Failed to read metadata: {}", e)))?;
        if metadata.is_file() {
            files.push((entry.file_name().to_string_lossy().into_owned(), metadata.len()));
        }
    }
    Ok(files)
}
