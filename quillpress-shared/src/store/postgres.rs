/// PostgreSQL-backed stores
///
/// Thin delegation to the query methods on [`Tag`] and [`Article`], with
/// constraint violations mapped through [`StoreError::from_sqlx`].

use super::{ArticleStore, StoreError, StoreResult, TagStore};
use crate::models::article::{Article, ArticleFilter, CreateArticle, UpdateArticle};
use crate::models::tag::{CreateTag, Tag, TagFilter, UpdateTag};
use async_trait::async_trait;
use sqlx::PgPool;

/// Store over a PostgreSQL pool
///
/// Cloning is cheap; the pool is reference counted.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TagStore for PgStore {
    async fn tag_exists(&self, id: i64) -> StoreResult<bool> {
        Tag::exists_by_id(&self.pool, id)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn tag_name_exists(&self, name: &str) -> StoreResult<bool> {
        Tag::exists_by_name(&self.pool, name)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn count_tags(&self, filter: &TagFilter) -> StoreResult<i64> {
        Tag::count(&self.pool, filter)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn list_tags(
        &self,
        offset: i64,
        limit: i64,
        filter: &TagFilter,
    ) -> StoreResult<Vec<Tag>> {
        Tag::list(&self.pool, offset, limit, filter)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn get_tag(&self, id: i64) -> StoreResult<Option<Tag>> {
        Tag::find_by_id(&self.pool, id)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn create_tag(&self, data: CreateTag) -> StoreResult<Tag> {
        Tag::create(&self.pool, data)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn update_tag(&self, id: i64, data: UpdateTag) -> StoreResult<bool> {
        Tag::update(&self.pool, id, data)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete_tag(&self, id: i64) -> StoreResult<bool> {
        Tag::delete(&self.pool, id)
            .await
            .map_err(StoreError::from_sqlx)
    }
}

#[async_trait]
impl ArticleStore for PgStore {
    async fn article_exists(&self, id: i64) -> StoreResult<bool> {
        Article::exists_by_id(&self.pool, id)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> StoreResult<i64> {
        Article::count(&self.pool, filter)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn list_articles(
        &self,
        offset: i64,
        limit: i64,
        filter: &ArticleFilter,
    ) -> StoreResult<Vec<Article>> {
        Article::list(&self.pool, offset, limit, filter)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn get_article(&self, id: i64) -> StoreResult<Option<Article>> {
        Article::find_by_id(&self.pool, id)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn create_article(&self, data: CreateArticle) -> StoreResult<Article> {
        Article::create(&self.pool, data)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn update_article(&self, id: i64, data: UpdateArticle) -> StoreResult<bool> {
        Article::update(&self.pool, id, data)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete_article(&self, id: i64) -> StoreResult<bool> {
        Article::delete(&self.pool, id)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn article_ids_by_tag(&self, tag_id: i64) -> StoreResult<Vec<i64>> {
        Article::ids_by_tag(&self.pool, tag_id)
            .await
            .map_err(StoreError::from_sqlx)
    }
}
