/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Dependency status
/// - `auth`: Token issuance
/// - `tags`: Tag CRUD
/// - `articles`: Article CRUD
///
/// Every handler reads its parameters from the query string, runs the
/// request struct's `validator` rules, and only then touches a service.

pub mod articles;
pub mod auth;
pub mod health;
pub mod tags;

use crate::error::{ApiError, ApiResult};
use quillpress_shared::models::State;

/// Converts an already range-checked `state` parameter
pub(crate) fn state_param(state: Option<i16>) -> ApiResult<Option<State>> {
    state
        .map(State::try_from)
        .transpose()
        .map_err(|e| ApiError::InvalidParams(e.to_string()))
}
