/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use quillpress_api::app::{build_router, AppState, Backends};
/// use quillpress_api::config::Config;
/// use quillpress_shared::auth::credentials::StaticCredentials;
/// use quillpress_shared::cache::memory::MemoryCache;
/// use quillpress_shared::store::memory::MemoryStore;
/// use std::sync::Arc;
///
/// # fn example(config: Config) {
/// let store = Arc::new(MemoryStore::new());
/// let backends = Backends {
///     db: None,
///     tags: store.clone(),
///     articles: store,
///     cache: Arc::new(MemoryCache::new()),
///     credentials: Arc::new(StaticCredentials::new("admin", "$argon2id$...")),
/// };
/// let app = build_router(AppState::new(config, backends));
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::auth::token_auth_layer, routes};
use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use quillpress_shared::{
    auth::{credentials::CredentialVerifier, TokenService},
    cache::{article::ArticleCache, CacheStore},
    services::{ArticleService, TagService},
    store::{ArticleStore, TagStore},
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Storage, cache and credential backends chosen at startup
pub struct Backends {
    /// Present when `store.backend = postgres`; probed by `/health`
    pub db: Option<PgPool>,
    pub tags: Arc<dyn TagStore>,
    pub articles: Arc<dyn ArticleStore>,
    pub cache: Arc<dyn CacheStore>,
    pub credentials: Arc<dyn CredentialVerifier>,
}

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is a handle, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Database connection pool, if PostgreSQL is the store
    pub db: Option<PgPool>,

    /// Article snapshot cache (also probed by `/health`)
    pub cache: ArticleCache,

    pub tokens: TokenService,
    pub tags: TagService,
    pub articles: ArticleService,
}

impl AppState {
    /// Wires services over the given backends
    pub fn new(config: Config, backends: Backends) -> Self {
        let cache = ArticleCache::new(backends.cache, config.cache.ttl_seconds);
        let tokens = TokenService::new(
            backends.credentials,
            &config.jwt.secret,
            chrono::Duration::seconds(config.jwt.ttl_seconds),
        );
        let tags = TagService::new(backends.tags.clone(), backends.articles.clone(), cache.clone());
        let articles = ArticleService::new(backends.articles, backends.tags, cache.clone());

        Self {
            config: Arc::new(config),
            db: backends.db,
            cache,
            tokens,
            tags,
            articles,
        }
    }

    /// Items per page on list endpoints
    pub fn page_size(&self) -> i64 {
        self.config.app.page_size
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                    # Dependency status (public)
/// ├── GET /auth                      # Issue token (public)
/// └── /api/v1/                       # Token required (?token=)
///     ├── GET|POST   /tags
///     ├── PUT|DELETE /tags/:id
///     ├── GET|POST   /articles
///     └── GET|PUT|DELETE /articles/:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Envelope for bare 404/405/408 responses
/// 2. Request timeout (tower-http TimeoutLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. CORS (tower-http CorsLayer)
/// 5. Token authentication (`/api/v1` only)
///
/// Paths no route matches answer with an `InvalidParams` envelope.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/tags",
            get(routes::tags::list_tags).post(routes::tags::create_tag),
        )
        .route(
            "/tags/:id",
            put(routes::tags::update_tag).delete(routes::tags::delete_tag),
        )
        .route(
            "/articles",
            get(routes::articles::list_articles).post(routes::articles::create_article),
        )
        .route(
            "/articles/:id",
            get(routes::articles::get_article)
                .put(routes::articles::update_article)
                .delete(routes::articles::delete_article),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            token_auth_layer,
        ));

    let origins = state.config.server.cors_origin_list();
    let cors = if origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
            .max_age(Duration::from_secs(3600))
    };

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth", get(routes::auth::get_auth))
        .nest("/api/v1", api_routes)
        .fallback(route_not_found)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(timeout))
        .layer(axum::middleware::map_response(envelope_bare_errors))
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::InvalidParams("no such route".to_string())
}

/// Rewrites the plain-text responses produced by the router and tower-http
async fn envelope_bare_errors(response: Response) -> Response {
    match response.status() {
        StatusCode::REQUEST_TIMEOUT => {
            ApiError::InternalError("request timed out".to_string()).into_response()
        }
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => {
            ApiError::InvalidParams("no such route".to_string()).into_response()
        }
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{Envelope, ResponseCode};

    async fn envelope_of(response: Response) -> (StatusCode, Envelope) {
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_timeout_becomes_error_envelope() {
        let response = envelope_bare_errors(StatusCode::REQUEST_TIMEOUT.into_response()).await;
        let (status, envelope) = envelope_of(response).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(envelope, Envelope::empty(ResponseCode::Error));
    }

    #[tokio::test]
    async fn test_method_not_allowed_becomes_invalid_params() {
        let response = envelope_bare_errors(StatusCode::METHOD_NOT_ALLOWED.into_response()).await;
        let (status, envelope) = envelope_of(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(envelope.code, 400);
    }

    #[tokio::test]
    async fn test_not_found_becomes_invalid_params() {
        let response = envelope_bare_errors(StatusCode::NOT_FOUND.into_response()).await;
        let (status, envelope) = envelope_of(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(envelope.code, 400);
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let response = envelope_bare_errors(StatusCode::NO_CONTENT.into_response()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
