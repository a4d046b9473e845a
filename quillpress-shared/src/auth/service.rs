/// Token issuance and validation
///
/// [`TokenService`] is the only thing handlers and the auth middleware use.
/// It holds the signing secret and token lifetime fixed at startup and
/// never touches storage except through its [`CredentialVerifier`].

use super::credentials::{CredentialError, CredentialVerifier};
use super::jwt::{self, Claims, JwtError};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};

/// Authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Failed to create token: {0}")]
    TokenCreation(String),

    #[error("Credential backend error: {0}")]
    Backend(#[from] CredentialError),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::TokenExpired,
            JwtError::CreateError(msg) => AuthError::TokenCreation(msg),
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

/// Issues and validates signed, time-limited tokens
#[derive(Clone)]
pub struct TokenService {
    verifier: Arc<dyn CredentialVerifier>,
    secret: Arc<str>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, secret: &str, ttl: Duration) -> Self {
        Self {
            verifier,
            secret: Arc::from(secret),
            ttl,
        }
    }

    /// Verifies credentials and returns a token expiring after the TTL
    pub async fn issue_token(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if !self.verifier.verify(username, password).await? {
            debug!(username, "Rejected credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let claims = Claims::new(username, self.ttl);
        let token = jwt::create_token(&claims, &self.secret)?;

        info!(username, expires_at = claims.exp, "Issued token");
        Ok(token)
    }

    /// Checks signature, issuer and expiry
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(jwt::validate_token(token, &self.secret)?)
    }
}
