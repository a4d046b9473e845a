/// Article orchestration
///
/// Reads go through [`ArticleCache`] first; writes go straight to the store
/// and then drop the cached snapshot before returning, so the next read of
/// that article always sees the write.

use super::{ServiceError, ServiceResult};
use crate::cache::article::ArticleCache;
use crate::models::article::{Article, ArticleFilter, CreateArticle, UpdateArticle};
use crate::store::{ArticleStore, Page, Pagination, StoreError, TagStore};
use std::sync::Arc;
use tracing::{debug, info};

/// Article use cases
#[derive(Clone)]
pub struct ArticleService {
    articles: Arc<dyn ArticleStore>,
    tags: Arc<dyn TagStore>,
    cache: ArticleCache,
}

impl ArticleService {
    pub fn new(articles: Arc<dyn ArticleStore>, tags: Arc<dyn TagStore>, cache: ArticleCache) -> Self {
        Self {
            articles,
            tags,
            cache,
        }
    }

    /// Single article, served from cache when possible
    ///
    /// On a miss the store is read and, if the article exists, the cache is
    /// populated. Population failures are logged only.
    pub async fn get(&self, id: i64) -> ServiceResult<Article> {
        if let Some(article) = self.cache.lookup(id).await {
            return Ok(article);
        }

        let article = self
            .articles
            .get_article(id)
            .await?
            .ok_or(ServiceError::ArticleNotFound(id))?;

        debug!(article_id = id, "Article cache miss, populating");
        self.cache.populate(&article).await;
        Ok(article)
    }

    /// One page of articles matching `filter`; never cached
    pub async fn list(&self, filter: &ArticleFilter, page: Pagination) -> ServiceResult<Page<Article>> {
        let lists = self
            .articles
            .list_articles(page.offset, page.limit, filter)
            .await?;
        let total = self.articles.count_articles(filter).await?;
        Ok(Page { lists, total })
    }

    pub async fn create(&self, data: CreateArticle) -> ServiceResult<Article> {
        let tag_id = data.tag_id;
        self.ensure_tag(tag_id).await?;

        let article = self
            .articles
            .create_article(data)
            .await
            .map_err(|e| tag_gone(e, Some(tag_id)))?;

        info!(article_id = article.id, tag_id = article.tag_id, "Article created");
        Ok(article)
    }

    /// Applies a partial update and invalidates the cached snapshot
    pub async fn update(&self, id: i64, data: UpdateArticle) -> ServiceResult<()> {
        if !self.articles.article_exists(id).await? {
            return Err(ServiceError::ArticleNotFound(id));
        }
        if let Some(tag_id) = data.tag_id {
            self.ensure_tag(tag_id).await?;
        }

        let tag_id = data.tag_id;
        let updated = self
            .articles
            .update_article(id, data)
            .await
            .map_err(|e| tag_gone(e, tag_id))?;
        self.cache.invalidate(id).await;

        if !updated {
            return Err(ServiceError::ArticleNotFound(id));
        }
        info!(article_id = id, "Article updated");
        Ok(())
    }

    /// Deletes the article and invalidates the cached snapshot
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.articles.article_exists(id).await? {
            return Err(ServiceError::ArticleNotFound(id));
        }

        let deleted = self.articles.delete_article(id).await?;
        self.cache.invalidate(id).await;

        if !deleted {
            return Err(ServiceError::ArticleNotFound(id));
        }
        info!(article_id = id, "Article deleted");
        Ok(())
    }

    async fn ensure_tag(&self, tag_id: i64) -> ServiceResult<()> {
        if self.tags.tag_exists(tag_id).await? {
            Ok(())
        } else {
            Err(ServiceError::TagNotFound(tag_id))
        }
    }
}

/// A tag deleted between the pre-check and the write trips the foreign key
fn tag_gone(err: StoreError, tag_id: Option<i64>) -> ServiceError {
    match (err, tag_id) {
        (StoreError::ForeignKey(_), Some(tag_id)) => ServiceError::TagNotFound(tag_id),
        (err, _) => ServiceError::Store(err),
    }
}
