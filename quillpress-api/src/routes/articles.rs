/// Article endpoints
///
/// # Endpoints
///
/// - `GET    /api/v1/articles`      - List articles (`state`, `tag_id`, `page`)
/// - `GET    /api/v1/articles/:id`  - Fetch one article (cached)
/// - `POST   /api/v1/articles`      - Create an article
/// - `PUT    /api/v1/articles/:id`  - Edit an article
/// - `DELETE /api/v1/articles/:id`  - Delete an article
///
/// Every article embeds its tag. Single reads go through the snapshot
/// cache; writes drop the snapshot.

use crate::{
    app::AppState,
    error::ApiResult,
    extractors::{PathId, QueryParams},
    middleware::auth::AuthContext,
    response::ApiResponse,
    routes::state_param,
};
use axum::{extract::State, Extension};
use quillpress_shared::{
    models::article::{Article, ArticleFilter, CreateArticle, UpdateArticle},
    store::{Page, Pagination},
};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// List filters
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListArticlesRequest {
    #[validate(range(min = 0, max = 1, message = "State must be 0 or 1"))]
    pub state: Option<i16>,

    #[validate(range(min = 1, message = "Tag id must be at least 1"))]
    pub tag_id: Option<i64>,

    pub page: Option<i64>,
}

/// Create request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(range(min = 1, message = "Tag id must be at least 1"))]
    pub tag_id: i64,

    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 255, message = "Description must be 1-255 characters"))]
    pub desc: String,

    #[validate(length(min = 1, max = 65535, message = "Content must be 1-65535 characters"))]
    pub content: String,

    #[validate(length(min = 1, max = 100, message = "Creator must be 1-100 characters"))]
    pub created_by: String,

    #[validate(range(min = 0, max = 1, message = "State must be 0 or 1"))]
    pub state: Option<i16>,
}

/// Edit request; absent fields are left as they are
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(range(min = 1, message = "Tag id must be at least 1"))]
    pub tag_id: Option<i64>,

    #[validate(length(max = 100, message = "Title must be at most 100 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub desc: Option<String>,

    #[validate(length(max = 65535, message = "Content must be at most 65535 characters"))]
    pub content: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Modifier must be 1-100 characters"))]
    pub modified_by: String,

    #[validate(range(min = 0, max = 1, message = "State must be 0 or 1"))]
    pub state: Option<i16>,
}

/// Fetch one article
///
/// # Errors
///
/// - `400`: `id` is not a positive integer
/// - `10011`: no such article
pub async fn get_article(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<Article>> {
    Ok(ApiResponse(state.articles.get(id).await?))
}

/// List articles
pub async fn list_articles(
    State(state): State<AppState>,
    QueryParams(req): QueryParams<ListArticlesRequest>,
) -> ApiResult<ApiResponse<Page<Article>>> {
    req.validate()?;

    let filter = ArticleFilter {
        state: state_param(req.state)?,
        tag_id: req.tag_id,
    };
    let page = Pagination::new(req.page, state.page_size());

    Ok(ApiResponse(state.articles.list(&filter, page).await?))
}

/// Create an article
///
/// # Errors
///
/// - `400`: validation failed
/// - `10003`: `tag_id` names no tag
pub async fn create_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    QueryParams(req): QueryParams<CreateArticleRequest>,
) -> ApiResult<ApiResponse<Article>> {
    req.validate()?;

    let article = state
        .articles
        .create(CreateArticle {
            tag_id: req.tag_id,
            title: req.title,
            desc: req.desc,
            content: req.content,
            created_by: req.created_by,
            state: state_param(req.state)?.unwrap_or_default(),
        })
        .await?;

    tracing::debug!(user = %auth.username, article_id = article.id, "Create article request served");
    Ok(ApiResponse(article))
}

/// Edit an article
///
/// # Errors
///
/// - `400`: validation failed
/// - `10011`: no such article
/// - `10003`: the new `tag_id` names no tag
pub async fn update_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    PathId(id): PathId,
    QueryParams(req): QueryParams<UpdateArticleRequest>,
) -> ApiResult<ApiResponse<Value>> {
    req.validate()?;

    state
        .articles
        .update(
            id,
            UpdateArticle {
                tag_id: req.tag_id,
                title: non_empty(req.title),
                desc: non_empty(req.desc),
                content: non_empty(req.content),
                state: state_param(req.state)?,
                modified_by: req.modified_by,
            },
        )
        .await?;

    tracing::debug!(user = %auth.username, article_id = id, "Update article request served");
    Ok(ApiResponse::empty())
}

/// Delete an article
///
/// # Errors
///
/// - `10011`: no such article
pub async fn delete_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<Value>> {
    state.articles.delete(id).await?;

    tracing::debug!(user = %auth.username, article_id = id, "Delete article request served");
    Ok(ApiResponse::empty())
}

/// `?title=` with no value leaves the title unchanged
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
