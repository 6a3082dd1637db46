use ::redis::aio::ConnectionManager;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{CacheError, CacheStore};

/// Shared cache backed by Redis.
///
/// Entries are written with `PSETEX` so sub-second TTLs survive.
#[derive(Clone)]
pub struct RedisCacheStore {
    connection_manager: ConnectionManager,
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore")
            .field("connection_manager", &"ConnectionManager")
            .finish()
    }
}

impl RedisCacheStore {
    pub fn new(connection_manager: ConnectionManager) -> Self {
        Self { connection_manager }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection_manager.clone();
        let value: Option<Vec<u8>> = ::redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis GET failed: {}", e)))?;

        debug!(key, found = value.is_some(), "Redis GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection_manager.clone();
        let ttl_millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        ::redis::cmd("PSETEX")
            .arg(key)
            .arg(ttl_millis)
            .arg(value)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis PSETEX failed: {}", e)))?;

        debug!(key, ttl_millis, "Redis PSETEX");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection_manager.clone();

        ::redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis DEL failed: {}", e)))?;

        debug!(key, "Redis DEL");
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection_manager.clone();
        database::redis::check_health(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires actual Redis
    async fn test_redis_round_trip_and_expiry() {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let store = RedisCacheStore::new(database::redis::connect(&url).await.unwrap());

        store
            .set("taskItem_test", b"{}".to_vec(), Duration::from_millis(200))
            .await
            .unwrap();
        assert_eq!(store.get("taskItem_test").await.unwrap(), Some(b"{}".to_vec()));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(store.get("taskItem_test").await.unwrap(), None);

        store.remove("taskItem_test").await.unwrap();
        store.ping().await.unwrap();
    }
}
