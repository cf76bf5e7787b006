use crate::redis_cache::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Get-or-compute-or-invalidate over the shared cache backend.
///
/// The cache is a soft dependency: any backend failure during a read or a
/// write is logged and degraded around, and only the producer's own error
/// type can escape `get_or_compute`. Staleness is governed entirely by
/// explicit invalidation; every write path that changes data an entry was
/// derived from must call `invalidate` before reporting success.
///
/// Concurrent misses for the same key collapse into one producer run: losers
/// wait on a per-key guard and re-check the cache once the winner has stored
/// its result.
#[derive(Clone)]
pub struct CacheAside {
    cache: Cache,
    inflight: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl CacheAside {
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &str, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.cache.get::<T>(key).await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, computing directly");
                return producer().await;
            }
        }

        let guard = self.key_guard(key).await;
        let result = {
            let _locked = guard.lock().await;

            // a concurrent miss may have stored the value while we waited
            match self.cache.get::<T>(key).await {
                Ok(Some(value)) => Ok(value),
                Ok(None) => self.compute_and_store(key, producer).await,
                Err(e) => {
                    tracing::warn!(key, error = %e, "cache re-read failed, computing directly");
                    producer().await
                }
            }
        };
        self.release_guard(key, &guard).await;
        result
    }

    /// Remove the entry for `key`. Backend failures are swallowed: staleness
    /// is preferred over failing the write that triggered the invalidation.
    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            tracing::warn!(key, error = %e, "cache invalidation failed, entry may be stale");
        }
    }

    async fn compute_and_store<T, E, F, Fut>(&self, key: &str, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let value = producer().await?;
        if let Err(e) = self.cache.set(key, &value, None).await {
            tracing::warn!(key, error = %e, "cache write failed, returning computed value");
        }
        Ok(value)
    }

    async fn key_guard(&self, key: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        inflight.entry(key.to_string()).or_default().clone()
    }

    async fn release_guard(&self, key: &str, guard: &Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().await;
        // the map entry plus our clone are the only holders once every
        // waiter for this key is done
        if Arc::strong_count(guard) <= 2 {
            inflight.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redis_cache::CacheConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn unreachable_cache() -> CacheAside {
        CacheAside::new(
            Cache::new(CacheConfig {
                url: "redis://127.0.0.1:1".to_string(),
            })
            .unwrap(),
        )
    }

    fn live_cache() -> CacheAside {
        CacheAside::new(Cache::new(CacheConfig::from_env()).unwrap())
    }

    #[tokio::test]
    async fn backend_down_falls_back_to_producer() {
        let aside = unreachable_cache();
        let calls = AtomicUsize::new(0);

        let value: Result<String, String> = aside
            .get_or_compute("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("computed".to_string())
            })
            .await;

        assert_eq!(value.unwrap(), "computed");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backend_down_invalidate_is_swallowed() {
        let aside = unreachable_cache();
        aside.invalidate("missing").await;
    }

    #[tokio::test]
    async fn producer_error_propagates() {
        let aside = unreachable_cache();
        let result: Result<String, String> = aside
            .get_or_compute("k", || async { Err("boom".to_string()) })
            .await;
        assert_eq!(result.unwrap_err(), "boom");
    }

    #[tokio::test]
    #[ignore] // Only run with Redis available
    async fn hit_skips_producer() {
        let aside = live_cache();
        aside.invalidate("aside_hit_test").await;

        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let value: Result<u32, String> = aside
                .get_or_compute("aside_hit_test", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(value.unwrap(), 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        aside.invalidate("aside_hit_test").await;
    }

    #[tokio::test]
    #[ignore] // Only run with Redis available
    async fn invalidate_forces_recompute() {
        let aside = live_cache();
        aside.invalidate("aside_invalidate_test").await;

        let calls = AtomicUsize::new(0);
        let produce = || {
            calls.fetch_add(1, Ordering::SeqCst);
        };

        let _: Result<u32, String> = aside
            .get_or_compute("aside_invalidate_test", || async {
                produce();
                Ok(1)
            })
            .await;
        aside.invalidate("aside_invalidate_test").await;
        let _: Result<u32, String> = aside
            .get_or_compute("aside_invalidate_test", || async {
                produce();
                Ok(2)
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        aside.invalidate("aside_invalidate_test").await;
    }

    #[tokio::test]
    #[ignore] // Only run with Redis available
    async fn concurrent_misses_collapse_into_one_producer_run() {
        let aside = live_cache();
        aside.invalidate("aside_singleflight_test").await;

        let calls = Arc::new(AtomicUsize::new(0));
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let aside = aside.clone();
            let calls = calls.clone();
            tasks.push(tokio::spawn(async move {
                let value: Result<u32, String> = aside
                    .get_or_compute("aside_singleflight_test", || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                        Ok(42)
                    })
                    .await;
                value.unwrap()
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        aside.invalidate("aside_singleflight_test").await;
    }
}
