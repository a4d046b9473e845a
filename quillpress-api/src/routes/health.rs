/// Health check endpoint
///
/// Reports whether the server can reach its database and cache. Always
/// answers `code: 200`; a failed probe shows up as `"degraded"`.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "code": 200,
///   "msg": "ok",
///   "data": {
///     "status": "healthy",
///     "version": "0.1.0",
///     "database": "connected",
///     "cache": "connected"
///   }
/// }
/// ```
///
/// `database` is `"not_configured"` when the in-memory store is in use.

use crate::{app::AppState, error::ApiResult, response::ApiResponse};
use axum::extract::State;
use quillpress_shared::db::pool;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,

    /// Cache status
    pub cache: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<ApiResponse<HealthResponse>> {
    let database = match &state.db {
        Some(db) => match pool::health_check(db).await {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                "disconnected"
            }
        },
        None => "not_configured",
    };

    let cache = match state.cache.store().ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Cache health check failed");
            "disconnected"
        }
    };

    let healthy = database != "disconnected" && cache != "disconnected";

    Ok(ApiResponse(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        cache: cache.to_string(),
    }))
}
