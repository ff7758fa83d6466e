//! 模型缓存
//!
//! 按键惰性加载并缓存模型能力，进程生命周期内不淘汰。
//! 每个键对应一个 `OnceCell`：同一键的并发首次访问只会执行一次加载，
//! 不同键之间互不阻塞；加载失败不会写入缓存，下次访问会重试。

use crate::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

/// 模型缓存
pub struct ModelCache<V: ?Sized> {
    entries: RwLock<HashMap<String, Arc<OnceCell<Arc<V>>>>>,
}

impl<V: ?Sized + Send + Sync> ModelCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// 获取缓存值，不存在时调用 `loader` 加载并缓存
    pub async fn get_or_load<F, Fut>(&self, key: &str, loader: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<V>>>,
    {
        let cell = self.cell(key).await;
        let value = cell
            .get_or_try_init(|| async {
                tracing::info!("Initializing model cache entry: {}", key);
                let value = loader().await;
                if let Err(e) = &value {
                    tracing::error!("Failed to initialize {}: {}", key, e);
                }
                value
            })
            .await?;
        Ok(value.clone())
    }

    /// 获取已加载的值
    pub async fn get(&self, key: &str) -> Option<Arc<V>> {
        let entries = self.entries.read().await;
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// 检查键是否已加载
    pub async fn is_loaded(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    /// 已加载的键（排序）
    pub async fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    async fn cell(&self, key: &str) -> Arc<OnceCell<Arc<V>>> {
        if let Some(cell) = self.entries.read().await.get(key) {
            return cell.clone();
        }
        self.entries
            .write()
            .await
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}

impl<V: ?Sized + Send + Sync> Default for ModelCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ModelError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_loads_once() {
        let cache: ModelCache<String> = ModelCache::new();
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_load("sentiment_pipeline", || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new("model".to_string()))
                })
                .await
                .unwrap();
            assert_eq!(value.as_str(), "model");
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.keys().await, vec!["sentiment_pipeline".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_first_access_loads_once() {
        let cache: Arc<ModelCache<usize>> = Arc::new(ModelCache::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let loads = loads.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_load("ner_pipeline", || async move {
                        loads.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok(Arc::new(7))
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(*handle.await.unwrap(), 7);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache: ModelCache<String> = ModelCache::new();

        let err = cache
            .get_or_load("model_./relation", || async {
                Err(ModelError::NotFound("./relation".to_string()).into())
            })
            .await;
        assert!(err.is_err());
        assert!(!cache.is_loaded("model_./relation").await);
        assert!(cache.keys().await.is_empty());

        // 第二次调用会重新执行加载
        let value = cache
            .get_or_load("model_./relation", || async { Ok(Arc::new("ok".to_string())) })
            .await
            .unwrap();
        assert_eq!(value.as_str(), "ok");
    }

    #[tokio::test]
    async fn test_unsized_values() {
        let cache: ModelCache<dyn Fn() -> u8 + Send + Sync> = ModelCache::new();
        let f = cache
            .get_or_load("f", || async { Ok(Arc::new(|| 3u8) as Arc<dyn Fn() -> u8 + Send + Sync>) })
            .await
            .unwrap();
        assert_eq!(f(), 3);
    }
}
