/// Request extractors that reject with the envelope
///
/// Axum's stock `Path` and `Query` rejections answer with plain-text 400s.
/// These wrappers turn every extraction failure into
/// [`ApiError::InvalidParams`], so `id=abc` or `page=x` get the same
/// `{"code": 400, ...}` body as a failed validation rule.

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

/// Positive entity id taken from the `:id` path segment
///
/// ```rust,ignore
/// async fn get_article(PathId(id): PathId) -> ApiResult<ApiResponse<Article>> { ... }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::InvalidParams(e.body_text()))?;

        parse_id(&raw).map(PathId)
    }
}

/// Parses an id that must be an integer `>= 1`
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    let id: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidParams(format!("id '{}' is not an integer", raw)))?;

    if id < 1 {
        return Err(ApiError::InvalidParams(format!("id must be at least 1, got {}", id)));
    }
    Ok(id)
}

/// Query-string parameters deserialized into `T`
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::InvalidParams(e.body_text()))?;

        Ok(QueryParams(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde::Deserialize;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("7").unwrap(), 7);
        assert!(matches!(parse_id("0"), Err(ApiError::InvalidParams(_))));
        assert!(matches!(parse_id("-3"), Err(ApiError::InvalidParams(_))));
        assert!(matches!(parse_id("abc"), Err(ApiError::InvalidParams(_))));
    }

    #[derive(Debug, Deserialize)]
    struct Paging {
        page: Option<i64>,
    }

    #[tokio::test]
    async fn test_query_params_rejection_is_invalid_params() {
        let (mut parts, _) = Request::builder()
            .uri("/api/v1/tags?page=abc")
            .body(())
            .unwrap()
            .into_parts();

        let result = QueryParams::<Paging>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_query_params_extracts() {
        let (mut parts, _) = Request::builder()
            .uri("/api/v1/tags?page=3")
            .body(())
            .unwrap()
            .into_parts();

        let QueryParams(paging) = QueryParams::<Paging>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(paging.page, Some(3));
    }
}
