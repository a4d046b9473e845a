/// Middleware for the API server
///
/// - [`auth`]: token check for everything under `/api/v1`

pub mod auth;
