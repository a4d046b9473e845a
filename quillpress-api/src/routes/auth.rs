/// Authentication endpoint
///
/// # Endpoints
///
/// - `GET /auth?username=&password=` - Exchange credentials for a token
///
/// The returned token is passed as `?token=` on every `/api/v1` call and
/// expires after `jwt.ttl_seconds`.

use crate::{
    app::AppState,
    error::ApiResult,
    extractors::QueryParams,
    response::ApiResponse,
};
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Credentials
#[derive(Debug, Deserialize, Validate)]
pub struct AuthRequest {
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: String,

    #[validate(length(min = 1, max = 50, message = "Password must be 1-50 characters"))]
    pub password: String,
}

/// Issued token
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Issue a token
///
/// # Errors
///
/// - `400`: missing or over-long username/password
/// - `20004`: wrong username or password
/// - `20003`: signing failed
pub async fn get_auth(
    State(state): State<AppState>,
    QueryParams(req): QueryParams<AuthRequest>,
) -> ApiResult<ApiResponse<AuthResponse>> {
    req.validate()?;

    let token = state.tokens.issue_token(&req.username, &req.password).await?;

    Ok(ApiResponse(AuthResponse { token }))
}
