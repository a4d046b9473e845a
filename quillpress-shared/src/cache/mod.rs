/// Cache layer
///
/// A small key-value contract ([`CacheStore`]) with two backends, plus the
/// article-specific policy built on top of it.
///
/// # Modules
///
/// - [`redis_client`]: Redis connection management (ConnectionManager, PING)
/// - [`redis_store`]: [`CacheStore`] over Redis (`SET EX`, `GET`, `EXISTS`, `DEL`)
/// - [`memory`]: [`CacheStore`] over an in-process TTL map
/// - [`keys`]: Key derivation (`ARTICLE_<id>`)
/// - [`snapshot`]: Versioned JSON encoding of cached articles
/// - [`article`]: Cache-aside policy for single-article reads
///
/// # Example
///
/// ```
/// use quillpress_shared::cache::{memory::MemoryCache, CacheStore};
///
/// # async fn example() -> Result<(), quillpress_shared::cache::CacheError> {
/// let cache = MemoryCache::new();
/// cache.set("ARTICLE_1", b"{}".to_vec(), 60).await?;
/// assert!(cache.exists("ARTICLE_1").await?);
///
/// cache.delete("ARTICLE_1").await?;
/// cache.delete("ARTICLE_1").await?; // deleting a missing key is fine
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;

pub mod article;
pub mod keys;
pub mod memory;
pub mod redis_client;
pub mod redis_store;
pub mod snapshot;

/// Longest lifetime a cache entry may be given (one year)
pub const MAX_TTL_SECONDS: u64 = 365 * 24 * 3600;

/// Cache operation errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Key is absent or expired
    #[error("Cache key not found: {0}")]
    NotFound(String),

    /// Backend did not answer within the command timeout
    #[error("Cache command timed out after {0}s")]
    Timeout(u64),

    /// Backend failure (connection, protocol)
    #[error("Cache backend error: {0}")]
    Backend(String),
}

impl From<redis_client::RedisClientError> for CacheError {
    fn from(err: redis_client::RedisClientError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

/// Result alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store with per-entry expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Returns [`CacheError::NotFound`] for absent or expired keys
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> CacheResult<()>;

    /// Idempotent: deleting a missing key succeeds
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Liveness probe for `/health`
    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }
}
