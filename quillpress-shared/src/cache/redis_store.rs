/// Redis-backed [`CacheStore`]
///
/// | Operation | Command |
/// |-----------|---------|
/// | exists    | `EXISTS key` |
/// | get       | `GET key` (nil → [`CacheError::NotFound`]) |
/// | set       | `SET key value EX ttl` |
/// | delete    | `DEL key` |
///
/// Every command runs under the client's command timeout. A cache built
/// with [`RedisCache::lazy`] connects on first use and retries on each call
/// until Redis answers; until then every operation fails like any other
/// backend error.

use super::redis_client::{RedisClient, RedisClientError, RedisConfig};
use super::{CacheError, CacheResult, CacheStore};
use async_trait::async_trait;
use redis::AsyncCommands;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Cache stored in Redis
#[derive(Debug, Clone)]
pub struct RedisCache {
    config: RedisConfig,
    client: Arc<OnceCell<RedisClient>>,
}

impl RedisCache {
    /// Cache over an established connection
    pub fn new(client: RedisClient) -> Self {
        Self {
            config: client.config().clone(),
            client: Arc::new(OnceCell::new_with(Some(client))),
        }
    }

    /// Cache that connects on first use
    pub fn lazy(config: RedisConfig) -> Self {
        Self {
            config,
            client: Arc::new(OnceCell::new()),
        }
    }

    async fn client(&self) -> CacheResult<&RedisClient> {
        self.client
            .get_or_try_init(|| RedisClient::new(self.config.clone()))
            .await
            .map_err(map_err)
    }
}

fn map_err(err: RedisClientError) -> CacheError {
    match err {
        RedisClientError::Timeout(secs) => CacheError::Timeout(secs),
        other => CacheError::from(other),
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let client = self.client().await?;
        let mut conn = client.get_connection();
        client.timed(conn.exists(key)).await.map_err(map_err)
    }

    async fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        let client = self.client().await?;
        let mut conn = client.get_connection();
        let value: Option<Vec<u8>> = client.timed(conn.get(key)).await.map_err(map_err)?;
        value.ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> CacheResult<()> {
        let client = self.client().await?;
        let mut conn = client.get_connection();
        client
            .timed(conn.set_ex::<_, _, ()>(key, value, ttl_seconds))
            .await
            .map_err(map_err)
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let client = self.client().await?;
        let mut conn = client.get_connection();
        let _removed: i64 = client.timed(conn.del(key)).await.map_err(map_err)?;
        Ok(())
    }

    async fn ping(&self) -> CacheResult<()> {
        match self.client().await?.ping().await.map_err(map_err)? {
            true => Ok(()),
            false => Err(CacheError::Backend("unexpected PING response".to_string())),
        }
    }
}
