/// Cache-aside policy for single-article reads
///
/// ```text
/// lookup(id)
///   ├─> EXISTS ARTICLE_<id>        no  → miss
///   ├─> GET ARTICLE_<id>           err → miss
///   └─> decode snapshot            version mismatch / corrupt → DEL, miss
///
/// populate(article)   SET ARTICLE_<id> <snapshot> EX ttl   (errors logged)
/// invalidate(id)      DEL ARTICLE_<id>                     (errors logged)
/// ```
///
/// Nothing here returns an error: the cache only ever degrades to a miss.

use super::keys::article_key;
use super::snapshot::{self, SnapshotError};
use super::{CacheError, CacheStore};
use crate::models::article::Article;
use std::sync::Arc;
use tracing::{debug, warn};

/// Article snapshot cache over any [`CacheStore`]
#[derive(Clone)]
pub struct ArticleCache {
    store: Arc<dyn CacheStore>,
    ttl_seconds: u64,
}

impl std::fmt::Debug for ArticleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleCache")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl ArticleCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Underlying key-value store
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Returns the cached article, or `None` on any kind of miss
    pub async fn lookup(&self, id: i64) -> Option<Article> {
        let key = article_key(id);

        match self.store.exists(&key).await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache exists check failed");
                return None;
            }
        }

        let bytes = match self.store.get(&key).await {
            Ok(bytes) => bytes,
            // expired between EXISTS and GET
            Err(CacheError::NotFound(_)) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed");
                return None;
            }
        };

        match snapshot::decode(&bytes) {
            Ok(article) => {
                debug!(key = %key, "Article cache hit");
                Some(article)
            }
            Err(e) => {
                match &e {
                    SnapshotError::VersionMismatch { .. } => {
                        debug!(key = %key, error = %e, "Discarding stale snapshot")
                    }
                    SnapshotError::Corrupt(_) => {
                        warn!(key = %key, error = %e, "Discarding corrupt snapshot")
                    }
                }
                self.delete_key(&key).await;
                None
            }
        }
    }

    /// Stores a snapshot of `article` for the configured TTL
    pub async fn populate(&self, article: &Article) {
        let key = article_key(article.id);
        let bytes = match snapshot::encode(article) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to encode article snapshot");
                return;
            }
        };

        if let Err(e) = self.store.set(&key, bytes, self.ttl_seconds).await {
            warn!(key = %key, error = %e, "Failed to populate article cache");
        }
    }

    /// Drops the cached snapshot of article `id`
    pub async fn invalidate(&self, id: i64) {
        self.delete_key(&article_key(id)).await;
    }

    /// Drops the cached snapshots of every article in `ids`
    pub async fn invalidate_many(&self, ids: &[i64]) {
        for &id in ids {
            self.invalidate(id).await;
        }
    }

    async fn delete_key(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            warn!(key = %key, error = %e, "Failed to invalidate cache entry");
        }
    }
}
