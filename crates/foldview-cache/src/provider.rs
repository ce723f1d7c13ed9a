//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use foldview_core::config::cache::CacheConfig;
use foldview_core::error::AppError;
use foldview_core::result::AppResult;
use foldview_core::traits::cache::CacheProvider;

/// Cache manager that wraps the configured cache provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The inner cache provider.
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis cache provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCacheProvider::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory cache provider");
                Arc::new(crate::memory::MemoryCacheProvider::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self { inner: provider }
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, session: &str, slot: &str) -> AppResult<Option<String>> {
        self.inner.get(session, slot).await
    }

    async fn put(&self, session: &str, slot: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.put(session, slot, value, ttl).await
    }

    async fn drop_session(&self, session: &str) -> AppResult<u64> {
        self.inner.drop_session(session).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_provider_is_configuration_error() {
        let config = CacheConfig {
            provider: "layered".to_string(),
            ..CacheConfig::default()
        };
        let err = CacheManager::new(&config).await.unwrap_err();
        assert_eq!(err.kind, foldview_core::error::ErrorKind::Configuration);
    }

    #[cfg(feature = "memory")]
    #[tokio::test]
    async fn test_manager_delegates_to_memory_provider() {
        let manager = CacheManager::new(&CacheConfig::default()).await.unwrap();
        manager
            .put("s", "full", "[]", Duration::from_secs(60))
            .await
            .unwrap();
        let typed: Option<Vec<u8>> = manager.get_json("s", "full").await.unwrap();
        assert_eq!(typed, Some(vec![]));
        assert_eq!(manager.drop_session("s").await.unwrap(), 1);
        assert_eq!(manager.get("s", "full").await.unwrap(), None);
    }
}
