/// Domain services
///
/// Services own the ordering rules of every write: existence pre-checks
/// first, then the mutation, then cache invalidation. Handlers validate
/// input and call exactly one service method.
///
/// - [`ArticleService`]: cache-aside reads, tag-checked writes
/// - [`TagService`]: unique names, guarded deletes, invalidation of
///   articles that embed an edited tag

use crate::store::StoreError;

pub mod article;
pub mod tag;

pub use article::ArticleService;
pub use tag::TagService;

/// Domain-level failures surfaced to handlers
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Article {0} does not exist")]
    ArticleNotFound(i64),

    #[error("Tag {0} does not exist")]
    TagNotFound(i64),

    #[error("Tag name '{0}' already exists")]
    TagExists(String),

    #[error("Tag {0} is still referenced by articles")]
    TagInUse(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
