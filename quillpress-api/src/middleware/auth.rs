/// Token authentication for `/api/v1`
///
/// The token travels in the `token` query parameter:
///
/// ```text
/// GET /api/v1/articles?token=<jwt>&page=2
/// ```
///
/// | Outcome            | Envelope code |
/// |--------------------|---------------|
/// | missing / empty    | 400           |
/// | bad signature etc. | 20001         |
/// | expired            | 20002         |
///
/// On success an [`AuthContext`] is inserted into the request extensions.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

/// Identity of the caller, available to handlers via `Extension<AuthContext>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Validates the `token` query parameter before any handler runs
pub async fn token_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = Query::<TokenQuery>::try_from_uri(req.uri())
        .map_err(|e| ApiError::InvalidParams(e.body_text()))?
        .0
        .token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::InvalidParams("Missing token".to_string()))?;

    let claims = state.tokens.validate_token(&token)?;

    req.extensions_mut().insert(AuthContext {
        username: claims.sub,
    });

    Ok(next.run(req).await)
}
