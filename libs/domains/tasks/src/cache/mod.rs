//! Cache capability consumed by [`crate::TaskService`].
//!
//! [`CacheStore`] is the byte-level backend (Redis or in-process moka).
//! [`TaskCache`] layers JSON encoding, the entry TTL and failure absorption on
//! top: lookups come back as [`CacheLookup`] and write failures are logged,
//! never returned.

mod key;
mod memory;
mod redis;

pub use key::CacheKey;
pub use memory::MemoryCacheStore;
pub use self::redis::RedisCacheStore;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// How long list and item entries stay cached
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cached value for {key} could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("value for {key} could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Byte-level cache backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, replacing any previous entry, for `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

/// Outcome of a typed cache read
#[derive(Debug)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
    /// Backend or decode failure; callers treat it as a miss
    Failed(CacheError),
}

impl<T> CacheLookup<T> {
    pub fn into_hit(self) -> Option<T> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            CacheLookup::Miss | CacheLookup::Failed(_) => None,
        }
    }
}

/// Typed JSON view over a shared [`CacheStore`]
#[derive(Clone)]
pub struct TaskCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl TaskCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn with_default_ttl(store: Arc<dyn CacheStore>) -> Self {
        Self::new(store, DEFAULT_CACHE_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!("Cache miss for key: {}", key);
                return CacheLookup::Miss;
            }
            Err(e) => {
                warn!(error = %e, "Cache read failed for key: {}", key);
                return CacheLookup::Failed(e);
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                info!("Cache hit for key: {}", key);
                CacheLookup::Hit(value)
            }
            Err(source) => {
                error!(error = %source, "Failed to deserialize cached value for key: {}", key);
                CacheLookup::Failed(CacheError::Decode {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    /// Cache `value` for the configured TTL. Failures are logged and swallowed.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(source) => {
                let e = CacheError::Encode {
                    key: key.to_string(),
                    source,
                };
                error!(error = %e, "Cache write skipped");
                return;
            }
        };

        match self.store.set(key, bytes, self.ttl).await {
            Ok(()) => info!("Data cached with key: {}", key),
            Err(e) => warn!(error = %e, "Cache write failed for key: {}", key),
        }
    }

    /// Remove `key`. Failures are logged and swallowed.
    pub async fn remove(&self, key: &str) {
        match self.store.remove(key).await {
            Ok(()) => info!("Cache removed for key: {}", key),
            Err(e) => warn!(error = %e, "Cache removal failed for key: {}", key),
        }
    }

    /// Remove each key in order. A failure on one key does not stop the rest.
    pub async fn invalidate(&self, keys: &[String]) {
        for key in keys {
            self.remove(key).await;
        }
    }

    pub async fn ping(&self) -> Result<(), CacheError> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn cache(store: MockCacheStore) -> TaskCache {
        TaskCache::with_default_ttl(Arc::new(store))
    }

    #[tokio::test]
    async fn test_get_decodes_hit() {
        let mut store = MockCacheStore::new();
        store
            .expect_get()
            .withf(|key| key == "taskItem_1")
            .returning(|_| Ok(Some(br#"{"n":1}"#.to_vec())));

        let lookup: CacheLookup<serde_json::Value> = cache(store).get("taskItem_1").await;
        assert_eq!(lookup.into_hit(), Some(serde_json::json!({"n": 1})));
    }

    #[tokio::test]
    async fn test_get_backend_error_is_failed_lookup() {
        let mut store = MockCacheStore::new();
        store
            .expect_get()
            .returning(|_| Err(CacheError::Backend("connection reset".into())));

        let lookup: CacheLookup<serde_json::Value> = cache(store).get("TaskItems_").await;
        assert!(matches!(lookup, CacheLookup::Failed(CacheError::Backend(_))));
    }

    #[tokio::test]
    async fn test_get_undecodable_payload_is_failed_lookup() {
        let mut store = MockCacheStore::new();
        store
            .expect_get()
            .returning(|_| Ok(Some(b"not json".to_vec())));

        let lookup: CacheLookup<Vec<u32>> = cache(store).get("TaskItems_").await;
        assert!(matches!(lookup, CacheLookup::Failed(CacheError::Decode { .. })));
        assert!(lookup.into_hit().is_none());
    }

    #[tokio::test]
    async fn test_set_uses_configured_ttl() {
        let mut store = MockCacheStore::new();
        store
            .expect_set()
            .withf(|key, value, ttl| {
                key == "TaskItems_True" && value == b"[1,2]" && *ttl == Duration::from_secs(30)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let cache = TaskCache::new(Arc::new(store), Duration::from_secs(30));
        cache.set("TaskItems_True", &[1, 2]).await;
    }

    #[tokio::test]
    async fn test_set_failure_is_swallowed() {
        let mut store = MockCacheStore::new();
        store
            .expect_set()
            .returning(|_, _, _| Err(CacheError::Backend("read-only replica".into())));

        cache(store).set("taskItem_4", "value").await;
    }

    #[tokio::test]
    async fn test_invalidate_continues_after_failure() {
        let mut store = MockCacheStore::new();
        store
            .expect_remove()
            .with(eq("a"))
            .times(1)
            .returning(|_| Err(CacheError::Backend("timeout".into())));
        store
            .expect_remove()
            .with(eq("b"))
            .times(1)
            .returning(|_| Ok(()));

        cache(store)
            .invalidate(&["a".to_string(), "b".to_string()])
            .await;
    }
}
