/// Authentication
///
/// # Modules
///
/// - [`password`]: Argon2id hashing and verification
/// - [`jwt`]: HS256 claims, signing and validation
/// - [`credentials`]: Pluggable username/password verification
/// - [`service`]: [`TokenService`], the entry point used by the API
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use quillpress_shared::auth::credentials::StaticCredentials;
/// use quillpress_shared::auth::password::hash_password;
/// use quillpress_shared::auth::TokenService;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let verifier = StaticCredentials::new("test", hash_password("test123456")?);
/// let tokens = TokenService::new(
///     Arc::new(verifier),
///     "a-secret-that-is-at-least-32-bytes-long",
///     Duration::hours(3),
/// );
///
/// let token = tokens.issue_token("test", "test123456").await?;
/// assert_eq!(tokens.validate_token(&token)?.sub, "test");
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod jwt;
pub mod password;
pub mod service;

pub use service::{AuthError, TokenService};
