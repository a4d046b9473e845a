#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - A full router over the in-memory store and cache
/// - Call counters on both, to prove a request never reached them
/// - Token helpers
/// - Request helpers returning the decoded envelope

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use quillpress_api::app::{build_router, AppState, Backends};
use quillpress_api::config::{CacheBackend, Config, StoreBackend};
use quillpress_shared::auth::credentials::StaticCredentials;
use quillpress_shared::auth::jwt::{create_token, Claims};
use quillpress_shared::auth::password::hash_password;
use quillpress_shared::cache::memory::MemoryCache;
use quillpress_shared::cache::{CacheResult, CacheStore};
use quillpress_shared::models::article::{Article, ArticleFilter, CreateArticle, UpdateArticle};
use quillpress_shared::models::tag::{CreateTag, Tag, TagFilter, UpdateTag};
use quillpress_shared::store::memory::MemoryStore;
use quillpress_shared::store::{ArticleStore, StoreResult, TagStore};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::Service as _;

pub const USERNAME: &str = "test";
pub const PASSWORD: &str = "test123456";
pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
    pub store: Arc<CountingStore>,
    pub cache: Arc<CountingCache>,
    pub token: String,
}

impl TestContext {
    /// Creates a new test context over fresh in-memory backends
    pub fn new() -> Self {
        Self::with_page_size(10)
    }

    pub fn with_page_size(page_size: i64) -> Self {
        let mut config = Config::default();
        config.jwt.secret = SECRET.to_string();
        config.auth.username = USERNAME.to_string();
        config.auth.password_hash = hash_password(PASSWORD).unwrap();
        config.store.backend = StoreBackend::Memory;
        config.cache.backend = CacheBackend::Memory;
        config.app.page_size = page_size;
        config.log.file_enabled = false;
        config.validate().unwrap();

        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(CountingCache::default());
        let credentials = Arc::new(StaticCredentials::new(
            USERNAME,
            config.auth.password_hash.clone(),
        ));

        let state = AppState::new(
            config.clone(),
            Backends {
                db: None,
                tags: store.clone(),
                articles: store.clone(),
                cache: cache.clone(),
                credentials,
            },
        );

        TestContext {
            app: build_router(state),
            config,
            store,
            cache,
            token: token_expiring_in(chrono::Duration::hours(1)),
        }
    }

    /// Sends a request and decodes the envelope
    pub async fn send(&self, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or_else(|_| {
            panic!(
                "{} {} returned a non-JSON body: {}",
                method,
                uri,
                String::from_utf8_lossy(&body)
            )
        });

        (status, json)
    }

    /// Sends an authenticated request; `path_and_query` must not carry `token`
    pub async fn api(&self, method: &str, path_and_query: &str) -> Value {
        let separator = if path_and_query.contains('?') { '&' } else { '?' };
        let uri = format!("{}{}token={}", path_and_query, separator, self.token);
        let (status, body) = self.send(method, &uri).await;
        assert_eq!(status, StatusCode::OK, "{} {}: {}", method, uri, body);
        body
    }

    /// Creates a tag through the API and returns its id
    pub async fn create_tag(&self, name: &str) -> i64 {
        let body = self
            .api("POST", &format!("/api/v1/tags?name={}&created_by=admin&state=1", name))
            .await;
        assert_eq!(body["code"], 200, "create tag: {}", body);
        body["data"]["id"].as_i64().unwrap()
    }

    /// Creates an article through the API and returns its id
    pub async fn create_article(&self, tag_id: i64, title: &str) -> i64 {
        let body = self
            .api(
                "POST",
                &format!(
                    "/api/v1/articles?tag_id={}&title={}&desc=d&content=c&created_by=admin&state=1",
                    tag_id, title
                ),
            )
            .await;
        assert_eq!(body["code"], 200, "create article: {}", body);
        body["data"]["id"].as_i64().unwrap()
    }

    /// Total store plus cache calls so far
    pub fn backend_calls(&self) -> usize {
        self.store.calls() + self.cache.calls()
    }
}

/// Token for [`USERNAME`] signed with [`SECRET`]
pub fn token_expiring_in(expires_in: chrono::Duration) -> String {
    create_token(&Claims::new(USERNAME, expires_in), SECRET).unwrap()
}

/// [`MemoryStore`] that counts every call
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) -> &MemoryStore {
        self.calls.fetch_add(1, Ordering::SeqCst);
        &self.inner
    }
}

#[async_trait]
impl TagStore for CountingStore {
    async fn tag_exists(&self, id: i64) -> StoreResult<bool> {
        self.hit().tag_exists(id).await
    }

    async fn tag_name_exists(&self, name: &str) -> StoreResult<bool> {
        self.hit().tag_name_exists(name).await
    }

    async fn count_tags(&self, filter: &TagFilter) -> StoreResult<i64> {
        self.hit().count_tags(filter).await
    }

    async fn list_tags(&self, offset: i64, limit: i64, filter: &TagFilter) -> StoreResult<Vec<Tag>> {
        self.hit().list_tags(offset, limit, filter).await
    }

    async fn get_tag(&self, id: i64) -> StoreResult<Option<Tag>> {
        self.hit().get_tag(id).await
    }

    async fn create_tag(&self, data: CreateTag) -> StoreResult<Tag> {
        self.hit().create_tag(data).await
    }

    async fn update_tag(&self, id: i64, data: UpdateTag) -> StoreResult<bool> {
        self.hit().update_tag(id, data).await
    }

    async fn delete_tag(&self, id: i64) -> StoreResult<bool> {
        self.hit().delete_tag(id).await
    }
}

#[async_trait]
impl ArticleStore for CountingStore {
    async fn article_exists(&self, id: i64) -> StoreResult<bool> {
        self.hit().article_exists(id).await
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> StoreResult<i64> {
        self.hit().count_articles(filter).await
    }

    async fn list_articles(
        &self,
        offset: i64,
        limit: i64,
        filter: &ArticleFilter,
    ) -> StoreResult<Vec<Article>> {
        self.hit().list_articles(offset, limit, filter).await
    }

    async fn get_article(&self, id: i64) -> StoreResult<Option<Article>> {
        self.hit().get_article(id).await
    }

    async fn create_article(&self, data: CreateArticle) -> StoreResult<Article> {
        self.hit().create_article(data).await
    }

    async fn update_article(&self, id: i64, data: UpdateArticle) -> StoreResult<bool> {
        self.hit().update_article(id, data).await
    }

    async fn delete_article(&self, id: i64) -> StoreResult<bool> {
        self.hit().delete_article(id).await
    }

    async fn article_ids_by_tag(&self, tag_id: i64) -> StoreResult<Vec<i64>> {
        self.hit().article_ids_by_tag(tag_id).await
    }
}

/// [`MemoryCache`] that counts every call
#[derive(Default)]
pub struct CountingCache {
    pub inner: MemoryCache,
    calls: AtomicUsize,
}

impl CountingCache {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) -> &MemoryCache {
        self.calls.fetch_add(1, Ordering::SeqCst);
        &self.inner
    }
}

#[async_trait]
impl CacheStore for CountingCache {
    async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.hit().exists(key).await
    }

    async fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        self.hit().get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> CacheResult<()> {
        self.hit().set(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.hit().delete(key).await
    }
}
