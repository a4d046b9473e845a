/// Credential verification
///
/// `/auth` asks a [`CredentialVerifier`] whether a username/password pair
/// is valid. Which one is used comes from `auth.source`:
///
/// - [`StaticCredentials`]: a single account from configuration
/// - [`PgCredentials`]: accounts in the `blog_auth` table
///
/// Both store Argon2id PHC hashes, never plaintext.

use super::password::{verify_password, PasswordError};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

/// Errors a verifier can hit while looking up credentials
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Credential lookup failed: {0}")]
    Lookup(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Decides whether an identity/secret pair may obtain a token
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `Ok(false)` for unknown users and wrong passwords alike
    async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError>;
}

/// One configured account
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password_hash: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentials {
    async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        if username != self.username {
            return Ok(false);
        }
        Ok(verify_password(password, &self.password_hash)?)
    }
}

/// Accounts stored in `blog_auth`
#[derive(Debug, Clone)]
pub struct PgCredentials {
    pool: PgPool,
}

impl PgCredentials {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialVerifier for PgCredentials {
    async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM blog_auth WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        let Some(hash) = hash else {
            return Ok(false);
        };

        match verify_password(password, &hash) {
            Ok(valid) => Ok(valid),
            Err(PasswordError::InvalidHash(reason)) => {
                warn!(username, reason = %reason, "Stored password hash is unusable");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;

    #[tokio::test]
    async fn test_static_credentials() {
        let verifier = StaticCredentials::new("test", hash_password("test123456").unwrap());

        assert!(verifier.verify("test", "test123456").await.unwrap());
        assert!(!verifier.verify("test", "wrong").await.unwrap());
        assert!(!verifier.verify("other", "test123456").await.unwrap());
    }

    #[tokio::test]
    async fn test_static_credentials_bad_hash_is_error() {
        let verifier = StaticCredentials::new("test", "plaintext-by-mistake");
        assert!(matches!(
            verifier.verify("test", "plaintext-by-mistake").await,
            Err(CredentialError::Password(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Requires running PostgreSQL with migrations applied
    async fn test_pg_credentials() {
        use crate::db::migrations::run_migrations;
        use crate::db::pool::{create_pool, DatabaseConfig};

        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/quillpress_test".to_string());
        let pool = create_pool(DatabaseConfig {
            url,
            ..Default::default()
        })
        .await
        .unwrap();
        run_migrations(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO blog_auth (username, password_hash) VALUES ($1, $2)
             ON CONFLICT (username) DO UPDATE SET password_hash = EXCLUDED.password_hash",
        )
        .bind("pg-test-user")
        .bind(hash_password("secret-pass").unwrap())
        .execute(&pool)
        .await
        .unwrap();

        let verifier = PgCredentials::new(pool);
        assert!(verifier.verify("pg-test-user", "secret-pass").await.unwrap());
        assert!(!verifier.verify("pg-test-user", "nope").await.unwrap());
        assert!(!verifier.verify("nobody", "secret-pass").await.unwrap());
    }
}
