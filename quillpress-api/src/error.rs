/// Error handling for the API server
///
/// Handlers return `ApiResult<T>`; every error becomes an envelope whose
/// `code` identifies the failure and whose `data` is `{}`. Only
/// [`ApiError::InternalError`] changes the HTTP status (to 500).
///
/// # Example
///
/// ```no_run
/// use quillpress_api::error::{ApiError, ApiResult};
/// use quillpress_api::response::ApiResponse;
///
/// async fn handler(id: i64) -> ApiResult<ApiResponse<i64>> {
///     if id < 1 {
///         return Err(ApiError::InvalidParams("id must be at least 1".to_string()));
///     }
///     Ok(ApiResponse(id))
/// }
/// ```

use crate::response::{Envelope, ResponseCode};
use axum::response::{IntoResponse, Response};
use quillpress_shared::auth::AuthError;
use quillpress_shared::services::ServiceError;
use quillpress_shared::store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing parameter (400)
    InvalidParams(String),

    /// Declarative validation rules failed (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Tag name taken (10001)
    TagExists(String),

    /// Tag still referenced by articles (10002)
    TagInUse(i64),

    /// Tag missing (10003)
    TagNotFound(i64),

    /// Article missing (10011)
    ArticleNotFound(i64),

    /// Token malformed, forged or from another issuer (20001)
    InvalidToken(String),

    /// Token past its expiry (20002)
    TokenExpired,

    /// Signing failed (20003)
    TokenCreation(String),

    /// Wrong username or password (20004)
    InvalidCredentials,

    /// Anything else (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ApiError {
    pub fn response_code(&self) -> ResponseCode {
        match self {
            ApiError::InvalidParams(_) | ApiError::ValidationError(_) => ResponseCode::InvalidParams,
            ApiError::TagExists(_) => ResponseCode::TagExists,
            ApiError::TagInUse(_) => ResponseCode::TagInUse,
            ApiError::TagNotFound(_) => ResponseCode::TagNotFound,
            ApiError::ArticleNotFound(_) => ResponseCode::ArticleNotFound,
            ApiError::InvalidToken(_) => ResponseCode::AuthCheckTokenFail,
            ApiError::TokenExpired => ResponseCode::AuthCheckTokenTimeout,
            ApiError::TokenCreation(_) => ResponseCode::AuthToken,
            ApiError::InvalidCredentials => ResponseCode::Auth,
            ApiError::InternalError(_) => ResponseCode::Error,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidParams(msg) => write!(f, "Invalid params: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::TagExists(name) => write!(f, "Tag name '{}' already exists", name),
            ApiError::TagInUse(id) => write!(f, "Tag {} is still referenced", id),
            ApiError::TagNotFound(id) => write!(f, "Tag {} not found", id),
            ApiError::ArticleNotFound(id) => write!(f, "Article {} not found", id),
            ApiError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            ApiError::TokenExpired => write!(f, "Token expired"),
            ApiError::TokenCreation(msg) => write!(f, "Token creation failed: {}", msg),
            ApiError::InvalidCredentials => write!(f, "Invalid credentials"),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            // Log internal errors but don't expose details to clients
            ApiError::InternalError(msg) => tracing::error!("Internal error: {}", msg),
            ApiError::TokenCreation(msg) => tracing::error!("Token creation failed: {}", msg),
            ApiError::ValidationError(errors) => {
                tracing::debug!(?errors, "Request validation failed")
            }
            other => tracing::debug!(error = %other, "Request rejected"),
        }

        Envelope::empty(self.response_code()).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ArticleNotFound(id) => ApiError::ArticleNotFound(id),
            ServiceError::TagNotFound(id) => ApiError::TagNotFound(id),
            ServiceError::TagExists(name) => ApiError::TagExists(name),
            ServiceError::TagInUse(id) => ApiError::TagInUse(id),
            ServiceError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::InvalidToken(msg) => ApiError::InvalidToken(msg),
            AuthError::TokenExpired => ApiError::TokenExpired,
            AuthError::TokenCreation(msg) => ApiError::TokenCreation(msg),
            AuthError::Backend(e) => ApiError::InternalError(e.to_string()),
        }
    }
}
