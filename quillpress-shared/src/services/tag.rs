/// Tag orchestration
///
/// Cached article snapshots embed their tag, so editing a tag drops the
/// snapshot of every article filed under it.

use super::{ServiceError, ServiceResult};
use crate::cache::article::ArticleCache;
use crate::models::tag::{CreateTag, Tag, TagFilter, UpdateTag};
use crate::store::{ArticleStore, Page, Pagination, StoreError, TagStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Tag use cases
#[derive(Clone)]
pub struct TagService {
    tags: Arc<dyn TagStore>,
    articles: Arc<dyn ArticleStore>,
    cache: ArticleCache,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagStore>, articles: Arc<dyn ArticleStore>, cache: ArticleCache) -> Self {
        Self {
            tags,
            articles,
            cache,
        }
    }

    pub async fn list(&self, filter: &TagFilter, page: Pagination) -> ServiceResult<Page<Tag>> {
        let lists = self.tags.list_tags(page.offset, page.limit, filter).await?;
        let total = self.tags.count_tags(filter).await?;
        Ok(Page { lists, total })
    }

    /// Creates a tag with a name no other tag uses
    pub async fn create(&self, data: CreateTag) -> ServiceResult<Tag> {
        if self.tags.tag_name_exists(&data.name).await? {
            return Err(ServiceError::TagExists(data.name));
        }

        let name = data.name.clone();
        let tag = self
            .tags
            .create_tag(data)
            .await
            .map_err(|e| name_conflict(e, &name))?;

        info!(tag_id = tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    /// Applies a partial update, then invalidates every article snapshot
    /// that embeds this tag
    ///
    /// The affected articles are resolved before the write, so a failed
    /// lookup leaves both the tag and the cache untouched. Once the write
    /// has committed the update is reported as successful.
    pub async fn update(&self, id: i64, data: UpdateTag) -> ServiceResult<()> {
        if !self.tags.tag_exists(id).await? {
            return Err(ServiceError::TagNotFound(id));
        }
        let mut affected = self.articles.article_ids_by_tag(id).await?;

        let name = data.name.clone().unwrap_or_default();
        let updated = self
            .tags
            .update_tag(id, data)
            .await
            .map_err(|e| name_conflict(e, &name))?;
        if !updated {
            return Err(ServiceError::TagNotFound(id));
        }

        // articles filed under the tag while the write ran
        match self.articles.article_ids_by_tag(id).await {
            Ok(current) => {
                for article_id in current {
                    if !affected.contains(&article_id) {
                        affected.push(article_id);
                    }
                }
            }
            Err(e) => {
                warn!(tag_id = id, error = %e, "Failed to re-read articles under updated tag");
            }
        }
        self.cache.invalidate_many(&affected).await;

        info!(tag_id = id, invalidated = affected.len(), "Tag updated");
        Ok(())
    }

    /// Deletes a tag no article references
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.tags.tag_exists(id).await? {
            return Err(ServiceError::TagNotFound(id));
        }
        if !self.articles.article_ids_by_tag(id).await?.is_empty() {
            return Err(ServiceError::TagInUse(id));
        }

        match self.tags.delete_tag(id).await {
            Ok(true) => {
                info!(tag_id = id, "Tag deleted");
                Ok(())
            }
            Ok(false) => Err(ServiceError::TagNotFound(id)),
            // an article was filed under the tag after the check
            Err(StoreError::ForeignKey(_)) => Err(ServiceError::TagInUse(id)),
            Err(e) => Err(e.into()),
        }
    }
}

fn name_conflict(err: StoreError, name: &str) -> ServiceError {
    match err {
        StoreError::Conflict(_) => ServiceError::TagExists(name.to_string()),
        other => ServiceError::Store(other),
    }
}
