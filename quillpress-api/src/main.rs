//! # Quillpress API Server
//!
//! Blog backend serving tags and articles over HTTP, with token
//! authentication and a Redis snapshot cache in front of single-article reads.
//!
//! ## Usage
//!
//! ```bash
//! # Serve (reads conf/app.ini, .env and QUILLPRESS__* variables)
//! cargo run -p quillpress-api
//!
//! # Produce a value for auth.password_hash
//! cargo run -p quillpress-api -- hash-password 'test123456'
//! ```

use quillpress_api::{
    app::{build_router, AppState, Backends},
    config::{AuthSource, CacheBackend, Config, StoreBackend},
    telemetry,
};
use quillpress_shared::{
    auth::{
        credentials::{CredentialVerifier, PgCredentials, StaticCredentials},
        password,
    },
    cache::{
        memory::MemoryCache,
        redis_client::{sanitize_url, RedisClient, RedisClientError},
        redis_store::RedisCache,
        CacheStore,
    },
    db::{migrations, pool},
    store::{memory::MemoryStore, postgres::PgStore, ArticleStore, TagStore},
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => serve().await,
        Some("hash-password") => {
            let plain = args
                .next()
                .ok_or_else(|| anyhow::anyhow!("usage: quillpress-api hash-password <password>"))?;
            println!("{}", password::hash_password(&plain)?);
            Ok(())
        }
        Some(other) => anyhow::bail!("unknown command '{}'", other),
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = Config::load()?;
    let _log_guard = telemetry::init(&config)?;

    info!(
        "Quillpress API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let db = match config.store.backend {
        StoreBackend::Postgres => {
            let pool = pool::create_pool(config.database.clone()).await?;
            migrations::run_migrations(&pool).await?;
            Some(pool)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on shutdown");
            None
        }
    };

    let (tags, articles): (Arc<dyn TagStore>, Arc<dyn ArticleStore>) = match &db {
        Some(pool) => {
            let store = Arc::new(PgStore::new(pool.clone()));
            (store.clone(), store)
        }
        None => {
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        }
    };

    let cache: Arc<dyn CacheStore> = match config.cache.backend {
        CacheBackend::Redis => {
            info!(url = %sanitize_url(&config.redis.url), "Connecting to Redis");
            match RedisClient::new(config.redis.clone()).await {
                Ok(client) => Arc::new(RedisCache::new(client)),
                Err(e @ RedisClientError::ConfigError(_)) => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "Redis unavailable; serving from the database until it connects");
                    Arc::new(RedisCache::lazy(config.redis.clone()))
                }
            }
        }
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
    };

    let credentials: Arc<dyn CredentialVerifier> = match (config.auth.source, &db) {
        (AuthSource::Static, _) => Arc::new(StaticCredentials::new(
            config.auth.username.clone(),
            config.auth.password_hash.clone(),
        )),
        (AuthSource::Database, Some(pool)) => Arc::new(PgCredentials::new(pool.clone())),
        (AuthSource::Database, None) => {
            anyhow::bail!("auth.source = database requires store.backend = postgres")
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(
        config,
        Backends {
            db: db.clone(),
            tags,
            articles,
            cache,
            credentials,
        },
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = db {
        pool::close_pool(pool).await;
    }
    info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}
