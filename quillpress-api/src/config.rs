/// Configuration management for the API server
///
/// Settings are layered, lowest priority first:
///
/// 1. Built-in defaults (the `Default` impls below)
/// 2. `conf/app.ini`, or the file named by `QUILLPRESS_CONFIG` (optional)
/// 3. Environment variables prefixed `QUILLPRESS__`, with `__` between
///    section and key
///
/// `.env` is loaded into the environment first.
///
/// # Environment Variables
///
/// - `QUILLPRESS__SERVER__PORT`: Port to bind to (default: 8000)
/// - `QUILLPRESS__DATABASE__URL`: PostgreSQL connection string
/// - `QUILLPRESS__REDIS__URL`: Redis connection string
/// - `QUILLPRESS__JWT__SECRET`: Token signing secret (required, ≥ 32 chars)
/// - `QUILLPRESS__AUTH__PASSWORD_HASH`: Argon2id hash for the static account
/// - `RUST_LOG`: Overrides `log.level`
///
/// # Example
///
/// ```no_run
/// use quillpress_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use config::{Environment, File, FileFormat};
use quillpress_shared::auth::{jwt, password};
use quillpress_shared::cache::{self, redis_client::RedisConfig};
use quillpress_shared::db::pool::DatabaseConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "conf/app.ini";

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "QUILLPRESS_CONFIG";

const MIN_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Requests still running after this many seconds are aborted
    pub request_timeout_secs: u64,

    /// Comma-separated list of allowed origins; `*` allows any
    pub cors_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 60,
            cors_origins: "*".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Application-level settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Items per page on list endpoints
    pub page_size: i64,

    /// Base directory for runtime files (logs)
    pub runtime_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            runtime_root: PathBuf::from("runtime"),
        }
    }
}

/// Where tags and articles live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

/// Where article snapshots are cached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Lifetime of a cached article snapshot
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            ttl_seconds: 3600,
        }
    }
}

/// Token signing configuration
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HS256 signing secret
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime
    pub ttl_seconds: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_seconds: 3 * 3600,
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// Where `/auth` checks credentials
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthSource {
    /// A single account from this configuration
    #[default]
    Static,
    /// The `blog_auth` table
    Database,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub source: AuthSource,

    /// Username of the static account
    pub username: String,

    /// Argon2id PHC hash of the static account's password
    ///
    /// Generate with: `quillpress-api hash-password <password>`
    pub password_hash: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            source: AuthSource::Static,
            username: "admin".to_string(),
            password_hash: String::new(),
        }
    }
}

/// Console output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,

    /// Log directory, relative to `app.runtime_root`
    pub dir: PathBuf,

    /// Also write `<dir>/YYYY-MM-DD.log`
    pub file_enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "quillpress_api=debug,quillpress_shared=debug,tower_http=info".to_string(),
            format: LogFormat::Compact,
            dir: PathBuf::from("logs"),
            file_enabled: true,
        }
    }
}

impl Config {
    /// Loads `.env`, then the layered configuration, then validates it
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed, a value has the wrong
    /// type, or [`Config::validate`] rejects the result.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV).map(PathBuf::from);
        let explicit = path.is_ok();
        let path = path.unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let config = Self::load_from(&path, explicit)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` (required when `required` is set) and the environment
    pub fn load_from(path: &Path, required: bool) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                File::from(path)
                    .format(FileFormat::Ini)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix("QUILLPRESS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Rejects settings the server cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt.secret.chars().count() < MIN_SECRET_LEN {
            anyhow::bail!("jwt.secret must be at least {} characters long", MIN_SECRET_LEN);
        }
        if self.jwt.ttl_seconds <= 0 || self.jwt.ttl_seconds > jwt::MAX_TTL_SECONDS {
            anyhow::bail!("jwt.ttl_seconds must be between 1 and {}", jwt::MAX_TTL_SECONDS);
        }
        if self.app.page_size <= 0 {
            anyhow::bail!("app.page_size must be positive");
        }
        if self.cache.ttl_seconds == 0 || self.cache.ttl_seconds > cache::MAX_TTL_SECONDS {
            anyhow::bail!("cache.ttl_seconds must be between 1 and {}", cache::MAX_TTL_SECONDS);
        }
        if self.auth.source == AuthSource::Static {
            if self.auth.username.is_empty() {
                anyhow::bail!("auth.username is required when auth.source = static");
            }
            if let Err(e) = password::check_hash(&self.auth.password_hash) {
                anyhow::bail!("auth.password_hash must be an Argon2 PHC string: {}", e);
            }
        }
        if self.auth.source == AuthSource::Database && self.store.backend == StoreBackend::Memory {
            anyhow::bail!("auth.source = database requires store.backend = postgres");
        }
        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Directory the daily log files are written to
    pub fn log_dir(&self) -> PathBuf {
        self.app.runtime_root.join(&self.log.dir)
    }
}
