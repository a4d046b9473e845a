/// Tag endpoints
///
/// # Endpoints
///
/// - `GET    /api/v1/tags`      - List tags (`name`, `state`, `page` filters)
/// - `POST   /api/v1/tags`      - Create a tag
/// - `PUT    /api/v1/tags/:id`  - Edit a tag
/// - `DELETE /api/v1/tags/:id`  - Delete an unused tag
///
/// All parameters come from the query string.

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
    models::tag::{CreateTag, Tag, TagFilter, UpdateTag},
    store::{Page, Pagination},
};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// List filters
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListTagsRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 0, max = 1, message = "State must be 0 or 1"))]
    pub state: Option<i16>,

    /// 1-based; anything below 1 means the first page
    pub page: Option<i64>,
}

/// Create request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Creator must be 1-100 characters"))]
    pub created_by: String,

    #[validate(range(min = 0, max = 1, message = "State must be 0 or 1"))]
    pub state: Option<i16>,
}

/// Edit request; absent fields are left as they are
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTagRequest {
    #[validate(length(min = 1, max = 100, message = "Modifier must be 1-100 characters"))]
    pub modified_by: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 0, max = 1, message = "State must be 0 or 1"))]
    pub state: Option<i16>,
}

/// List tags
///
/// Returns `{"lists": [...], "total": n}` where `total` counts every
/// matching tag, not just this page.
pub async fn list_tags(
    State(state): State<AppState>,
    QueryParams(req): QueryParams<ListTagsRequest>,
) -> ApiResult<ApiResponse<Page<Tag>>> {
    req.validate()?;

    let filter = TagFilter {
        name: req.name,
        state: state_param(req.state)?,
    };
    let page = Pagination::new(req.page, state.page_size());

    Ok(ApiResponse(state.tags.list(&filter, page).await?))
}

/// Create a tag
///
/// # Errors
///
/// - `400`: validation failed
/// - `10001`: the name is taken
pub async fn create_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    QueryParams(req): QueryParams<CreateTagRequest>,
) -> ApiResult<ApiResponse<Tag>> {
    req.validate()?;

    let tag = state
        .tags
        .create(CreateTag {
            name: req.name,
            created_by: req.created_by,
            state: state_param(req.state)?.unwrap_or_default(),
        })
        .await?;

    tracing::debug!(user = %auth.username, tag_id = tag.id, "Create tag request served");
    Ok(ApiResponse(tag))
}

/// Edit a tag
///
/// # Errors
///
/// - `400`: validation failed
/// - `10003`: no such tag
/// - `10001`: the new name is taken
pub async fn update_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    PathId(id): PathId,
    QueryParams(req): QueryParams<UpdateTagRequest>,
) -> ApiResult<ApiResponse<Value>> {
    req.validate()?;

    state
        .tags
        .update(
            id,
            UpdateTag {
                name: req.name,
                state: state_param(req.state)?,
                modified_by: req.modified_by,
            },
        )
        .await?;

    tracing::debug!(user = %auth.username, tag_id = id, "Update tag request served");
    Ok(ApiResponse::empty())
}

/// Delete a tag
///
/// # Errors
///
/// - `10003`: no such tag
/// - `10002`: articles are still filed under it
pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    PathId(id): PathId,
) -> ApiResult<ApiResponse<Value>> {
    state.tags.delete(id).await?;

    tracing::debug!(user = %auth.username, tag_id = id, "Delete tag request served");
    Ok(ApiResponse::empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rules() {
        let ok = CreateTagRequest {
            name: "golang".to_string(),
            created_by: "admin".to_string(),
            state: Some(1),
        };
        assert!(ok.validate().is_ok());

        let long_name = CreateTagRequest {
            name: "x".repeat(101),
            ..ok_request()
        };
        assert!(long_name.validate().is_err());

        let bad_state = CreateTagRequest {
            state: Some(2),
            ..ok_request()
        };
        assert!(bad_state.validate().is_err());

        let empty_creator = CreateTagRequest {
            created_by: String::new(),
            ..ok_request()
        };
        assert!(empty_creator.validate().is_err());
    }

    fn ok_request() -> CreateTagRequest {
        CreateTagRequest {
            name: "golang".to_string(),
            created_by: "admin".to_string(),
            state: None,
        }
    }

    #[test]
    fn test_list_rules() {
        assert!(ListTagsRequest::default().validate().is_ok());
        assert!(ListTagsRequest {
            state: Some(-1),
            ..Default::default()
        }
        .validate()
        .is_err());
        // page is not range-checked; non-positive pages read the first page
        assert!(ListTagsRequest {
            page: Some(0),
            ..Default::default()
        }
        .validate()
        .is_ok());
    }
}
