/// Persistence gateway
///
/// Services talk to storage only through the [`TagStore`] and
/// [`ArticleStore`] traits. Two backends implement them:
///
/// - [`postgres::PgStore`]: the `blog_tag` / `blog_article` tables
/// - [`memory::MemoryStore`]: process-local maps for development and tests
///
/// Both honor the same contract: lists are ordered by ID ascending,
/// `create` stamps `created_at`, `update` stamps `modified_at`, and a
/// duplicate tag name surfaces as [`StoreError::Conflict`].
///
/// # Example
///
/// ```
/// use quillpress_shared::models::tag::{CreateTag, TagFilter};
/// use quillpress_shared::models::State;
/// use quillpress_shared::store::{memory::MemoryStore, TagStore};
///
/// # async fn example() -> Result<(), quillpress_shared::store::StoreError> {
/// let store = MemoryStore::new();
/// store
///     .create_tag(CreateTag {
///         name: "golang".to_string(),
///         created_by: "admin".to_string(),
///         state: State::Enabled,
///     })
///     .await?;
///
/// assert_eq!(store.count_tags(&TagFilter::default()).await?, 1);
/// # Ok(())
/// # }
/// ```

use crate::models::article::{Article, ArticleFilter, CreateArticle, UpdateArticle};
use crate::models::tag::{CreateTag, Tag, TagFilter, UpdateTag};
use async_trait::async_trait;
use serde::Serialize;

pub mod memory;
pub mod postgres;

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A foreign key rejected the write or delete
    #[error("Referenced row missing or still in use: {0}")]
    ForeignKey(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps constraint violations to their semantic variants
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => return StoreError::Conflict(db_err.message().to_string()),
                Some("23503") => return StoreError::ForeignKey(db_err.message().to_string()),
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Result alias for persistence operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One page of a list query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub lists: Vec<T>,
    pub total: i64,
}

/// Page window derived from a 1-based page number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
}

impl Pagination {
    /// `offset = (page - 1) * page_size` for `page > 0`, otherwise the first page
    pub fn new(page: Option<i64>, page_size: i64) -> Self {
        let offset = match page {
            Some(page) if page > 0 => (page - 1).saturating_mul(page_size),
            _ => 0,
        };
        Self {
            offset,
            limit: page_size,
        }
    }
}

/// Tag persistence operations
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn tag_exists(&self, id: i64) -> StoreResult<bool>;

    async fn tag_name_exists(&self, name: &str) -> StoreResult<bool>;

    async fn count_tags(&self, filter: &TagFilter) -> StoreResult<i64>;

    /// Tags matching `filter`, ordered by ID ascending
    async fn list_tags(&self, offset: i64, limit: i64, filter: &TagFilter)
        -> StoreResult<Vec<Tag>>;

    async fn get_tag(&self, id: i64) -> StoreResult<Option<Tag>>;

    async fn create_tag(&self, data: CreateTag) -> StoreResult<Tag>;

    /// Returns `false` when no tag has this ID
    async fn update_tag(&self, id: i64, data: UpdateTag) -> StoreResult<bool>;

    /// Returns `false` when no tag has this ID
    async fn delete_tag(&self, id: i64) -> StoreResult<bool>;
}

/// Article persistence operations
///
/// Every returned [`Article`] carries its tag.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn article_exists(&self, id: i64) -> StoreResult<bool>;

    async fn count_articles(&self, filter: &ArticleFilter) -> StoreResult<i64>;

    /// Articles matching `filter`, ordered by ID ascending
    async fn list_articles(
        &self,
        offset: i64,
        limit: i64,
        filter: &ArticleFilter,
    ) -> StoreResult<Vec<Article>>;

    async fn get_article(&self, id: i64) -> StoreResult<Option<Article>>;

    async fn create_article(&self, data: CreateArticle) -> StoreResult<Article>;

    async fn update_article(&self, id: i64, data: UpdateArticle) -> StoreResult<bool>;

    async fn delete_article(&self, id: i64) -> StoreResult<bool>;

    /// IDs of every article filed under `tag_id`
    async fn article_ids_by_tag(&self, tag_id: i64) -> StoreResult<Vec<i64>>;
}
