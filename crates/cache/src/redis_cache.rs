use crate::error::Result;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub url: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL").unwrap_or_else(|_| Self::default().url),
        }
    }
}

/// Thin Redis wrapper storing values as JSON strings.
///
/// The connection is established lazily on first use: the cache is a soft
/// dependency, and an unreachable backend must not prevent the process from
/// starting or a request from being answered.
#[derive(Clone)]
pub struct Cache {
    client: Client,
    manager: Arc<OnceCell<ConnectionManager>>,
}

impl Cache {
    pub fn new(config: CacheConfig) -> Result<Self> {
        let client = Client::open(config.url)?;
        Ok(Self {
            client,
            manager: Arc::new(OnceCell::new()),
        })
    }

    async fn conn(&self) -> Result<ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()))
            .await?;
        Ok(manager.clone())
    }

    /// Set a value in the cache with optional TTL (seconds)
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: Option<u64>,
    ) -> Result<()> {
        let serialized = serde_json::to_string(value)?;
        let mut conn = self.conn().await?;

        if let Some(ttl) = ttl_seconds {
            conn.set_ex::<_, _, ()>(key, serialized, ttl).await?;
        } else {
            conn.set::<_, _, ()>(key, serialized).await?;
        }

        Ok(())
    }

    /// Get a value from the cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.conn().await?;
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(s) => {
                let deserialized = serde_json::from_str(&s)?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// Delete a key from the cache. Deleting a missing key is a no-op.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    /// Ping Redis to check connection
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        redis::cmd("PING").query_async::<()>(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Only run with Redis available
    async fn test_redis_connection() {
        let config = CacheConfig::from_env();
        let cache = Cache::new(config).expect("Failed to create cache client");
        cache.ping().await.expect("Failed to ping Redis");
    }

    #[tokio::test]
    #[ignore]
    async fn test_set_get_delete() {
        let config = CacheConfig::from_env();
        let cache = Cache::new(config).unwrap();

        cache.set("test_key", &"test_value", Some(60)).await.unwrap();
        let value: Option<String> = cache.get("test_key").await.unwrap();
        assert_eq!(value, Some("test_value".to_string()));

        cache.delete("test_key").await.unwrap();
        let value: Option<String> = cache.get("test_key").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn unreachable_backend_errors_instead_of_panicking() {
        let cache = Cache::new(CacheConfig {
            url: "redis://127.0.0.1:1".to_string(),
        })
        .unwrap();
        assert!(cache.get::<String>("anything").await.is_err());
    }
}
