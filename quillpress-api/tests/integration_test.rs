/// Integration tests for the Quillpress API
///
/// These tests drive the full router (token middleware, extractors,
/// services, cache and store) over in-memory backends:
/// - Token issuance and rejection codes
/// - Tag and article CRUD through the envelope
/// - Cache freshness after writes and tag edits
/// - Validation failures that never reach a backend

mod common;

use axum::http::StatusCode;
use common::{token_expiring_in, TestContext, PASSWORD, USERNAME};
use quillpress_shared::auth::jwt::{create_token, Claims};
use quillpress_shared::cache::CacheStore;
use serde_json::{json, Value};

fn ids(page: &Value) -> Vec<i64> {
    page["data"]["lists"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_reports_backends() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send("GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["database"], "not_configured");
    assert_eq!(body["data"]["cache"], "connected");
}

#[tokio::test]
async fn test_unrouted_requests_get_envelope() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send("GET", "/nope").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 400);

    let body = ctx.api("GET", "/api/v1/nope").await;
    assert_eq!(body["code"], 400);

    let body = ctx.api("PATCH", "/api/v1/tags").await;
    assert_eq!(body["code"], 400);
    assert_eq!(ctx.backend_calls(), 0);
}

#[tokio::test]
async fn test_issued_token_opens_api() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send("GET", &format!("/auth?username={}&password={}", USERNAME, PASSWORD))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["msg"], "ok");
    let token = body["data"]["token"].as_str().unwrap();

    let (_, body) = ctx
        .send("GET", &format!("/api/v1/tags?token={}", token))
        .await;
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"], json!({"lists": [], "total": 0}));
}

#[tokio::test]
async fn test_auth_rejections() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send("GET", &format!("/auth?username={}&password=wrong", USERNAME))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 20004);
    assert_eq!(body["data"], json!({}));

    let (_, body) = ctx.send("GET", "/auth?username=test").await;
    assert_eq!(body["code"], 400);

    let long_name = "u".repeat(51);
    let (_, body) = ctx
        .send("GET", &format!("/auth?username={}&password={}", long_name, PASSWORD))
        .await;
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_token_check_codes() {
    let ctx = TestContext::new();

    let (_, missing) = ctx.send("GET", "/api/v1/articles").await;
    assert_eq!(missing["code"], 400);

    let (_, empty) = ctx.send("GET", "/api/v1/articles?token=").await;
    assert_eq!(empty["code"], 400);

    let (_, garbage) = ctx.send("GET", "/api/v1/articles?token=not-a-jwt").await;
    assert_eq!(garbage["code"], 20001);
    assert_eq!(garbage["msg"], "token check failed");

    let forged = create_token(
        &Claims::new(USERNAME, chrono::Duration::hours(1)),
        "some-other-secret-that-is-32-bytes-long",
    )
    .unwrap();
    let (_, forged) = ctx
        .send("GET", &format!("/api/v1/articles?token={}", forged))
        .await;
    assert_eq!(forged["code"], 20001);

    let expired = token_expiring_in(chrono::Duration::seconds(-5));
    let (status, expired) = ctx
        .send("GET", &format!("/api/v1/articles?token={}", expired))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(expired["code"], 20002);

    // rejected before any handler work
    assert_eq!(ctx.backend_calls(), 0);
}

#[tokio::test]
async fn test_duplicate_tag_name() {
    let ctx = TestContext::new();
    ctx.create_tag("golang").await;

    let body = ctx
        .api("POST", "/api/v1/tags?name=golang&created_by=admin")
        .await;
    assert_eq!(body["code"], 10001);
    assert_eq!(body["msg"], "tag name already exists");
}

#[tokio::test]
async fn test_tag_create_returns_entity() {
    let ctx = TestContext::new();

    let body = ctx.api("POST", "/api/v1/tags?name=rust&created_by=admin").await;

    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["name"], "rust");
    assert_eq!(body["data"]["created_by"], "admin");
    // state defaults to 0
    assert_eq!(body["data"]["state"], 0);
}

#[tokio::test]
async fn test_invalid_article_id_touches_nothing() {
    let ctx = TestContext::new();

    for path in ["/api/v1/articles/0", "/api/v1/articles/-4", "/api/v1/articles/abc"] {
        let body = ctx.api("GET", path).await;
        assert_eq!(body["code"], 400, "{}", path);
    }
    let body = ctx.api("PUT", "/api/v1/articles/0?modified_by=admin").await;
    assert_eq!(body["code"], 400);
    let body = ctx.api("DELETE", "/api/v1/articles/0").await;
    assert_eq!(body["code"], 400);

    assert_eq!(ctx.backend_calls(), 0);
}

#[tokio::test]
async fn test_title_length_limit() {
    let ctx = TestContext::new();
    let tag_id = ctx.create_tag("golang").await;
    let before = ctx.backend_calls();

    let body = ctx
        .api(
            "POST",
            &format!(
                "/api/v1/articles?tag_id={}&title={}&desc=d&content=c&created_by=admin",
                tag_id,
                "t".repeat(101)
            ),
        )
        .await;
    assert_eq!(body["code"], 400);
    assert_eq!(ctx.backend_calls(), before);

    let id = ctx.create_article(tag_id, &"t".repeat(100)).await;
    let body = ctx.api("GET", &format!("/api/v1/articles/{}", id)).await;
    assert_eq!(body["data"]["title"].as_str().unwrap().len(), 100);
}

#[tokio::test]
async fn test_article_requires_existing_tag() {
    let ctx = TestContext::new();

    let body = ctx
        .api(
            "POST",
            "/api/v1/articles?tag_id=42&title=t&desc=d&content=c&created_by=admin",
        )
        .await;
    assert_eq!(body["code"], 10003);

    let tag_id = ctx.create_tag("golang").await;
    let id = ctx.create_article(tag_id, "first").await;
    let body = ctx
        .api("PUT", &format!("/api/v1/articles/{}?tag_id=42&modified_by=admin", id))
        .await;
    assert_eq!(body["code"], 10003);
}

#[tokio::test]
async fn test_article_embeds_tag() {
    let ctx = TestContext::new();
    let tag_id = ctx.create_tag("golang").await;
    let id = ctx.create_article(tag_id, "Goroutines").await;

    let body = ctx.api("GET", &format!("/api/v1/articles/{}", id)).await;

    assert_eq!(body["code"], 200);
    let article = &body["data"];
    assert_eq!(article["tag_id"], tag_id);
    assert_eq!(article["tag"]["name"], "golang");
    assert_eq!(article["title"], "Goroutines");
    assert_eq!(article["desc"], "d");
}

#[tokio::test]
async fn test_second_read_is_served_from_cache() {
    let ctx = TestContext::new();
    let tag_id = ctx.create_tag("golang").await;
    let id = ctx.create_article(tag_id, "cached").await;
    let path = format!("/api/v1/articles/{}", id);

    ctx.api("GET", &path).await;
    let store_calls = ctx.store.calls();

    let body = ctx.api("GET", &path).await;
    assert_eq!(body["data"]["title"], "cached");
    assert_eq!(ctx.store.calls(), store_calls);
}

#[tokio::test]
async fn test_read_after_write_is_fresh() {
    let ctx = TestContext::new();
    let tag_id = ctx.create_tag("golang").await;
    let id = ctx.create_article(tag_id, "before").await;
    let path = format!("/api/v1/articles/{}", id);

    // populate the cache
    assert_eq!(ctx.api("GET", &path).await["data"]["title"], "before");

    let body = ctx
        .api("PUT", &format!("{}?title=after&modified_by=editor", path))
        .await;
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"], json!({}));

    let body = ctx.api("GET", &path).await;
    assert_eq!(body["data"]["title"], "after");
    assert_eq!(body["data"]["modified_by"], "editor");
    assert!(body["data"]["modified_at"].is_string());
}

#[tokio::test]
async fn test_delete_article() {
    let ctx = TestContext::new();
    let tag_id = ctx.create_tag("golang").await;
    let id = ctx.create_article(tag_id, "doomed").await;
    let path = format!("/api/v1/articles/{}", id);
    ctx.api("GET", &path).await;

    assert_eq!(ctx.api("DELETE", &path).await["code"], 200);
    assert_eq!(ctx.api("GET", &path).await["code"], 10011);
    assert_eq!(ctx.api("DELETE", &path).await["code"], 10011);
    assert!(!ctx.cache.inner.exists(&format!("ARTICLE_{}", id)).await.unwrap());
}

#[tokio::test]
async fn test_pagination_pages_are_disjoint() {
    let ctx = TestContext::with_page_size(2);
    for name in ["a", "b", "c", "d", "e"] {
        ctx.create_tag(name).await;
    }

    let first = ctx.api("GET", "/api/v1/tags?page=1").await;
    let second = ctx.api("GET", "/api/v1/tags?page=2").await;
    let third = ctx.api("GET", "/api/v1/tags?page=3").await;

    assert_eq!(first["data"]["total"], 5);
    assert_eq!(ids(&first), vec![1, 2]);
    assert_eq!(ids(&second), vec![3, 4]);
    assert_eq!(ids(&third), vec![5]);

    // no page, or a non-positive one, reads the first page
    assert_eq!(ids(&ctx.api("GET", "/api/v1/tags").await), vec![1, 2]);
    assert_eq!(ids(&ctx.api("GET", "/api/v1/tags?page=0").await), vec![1, 2]);

    assert_eq!(ctx.api("GET", "/api/v1/tags?page=x").await["code"], 400);
}

#[tokio::test]
async fn test_list_filters() {
    let ctx = TestContext::new();
    let go = ctx.create_tag("golang").await;
    let rust = ctx.create_tag("rust").await;
    ctx.create_article(go, "one").await;
    ctx.create_article(rust, "two").await;
    ctx.create_article(go, "three").await;
    ctx.api("POST", "/api/v1/tags?name=drafts&created_by=admin&state=0").await;

    let by_tag = ctx.api("GET", &format!("/api/v1/articles?tag_id={}", go)).await;
    assert_eq!(by_tag["data"]["total"], 2);
    assert_eq!(ids(&by_tag), vec![1, 3]);

    let enabled = ctx.api("GET", "/api/v1/tags?state=1").await;
    assert_eq!(enabled["data"]["total"], 2);

    let named = ctx.api("GET", "/api/v1/tags?name=rust").await;
    assert_eq!(ids(&named), vec![rust]);

    assert_eq!(ctx.api("GET", "/api/v1/tags?state=7").await["code"], 400);
    assert_eq!(ctx.api("GET", "/api/v1/articles?tag_id=0").await["code"], 400);
}

#[tokio::test]
async fn test_stale_snapshot_version_is_a_miss() {
    let ctx = TestContext::new();
    let tag_id = ctx.create_tag("golang").await;
    let id = ctx.create_article(tag_id, "real").await;
    let path = format!("/api/v1/articles/{}", id);
    let key = format!("ARTICLE_{}", id);
    ctx.api("GET", &path).await;

    let mut snapshot: Value = serde_json::from_slice(&ctx.cache.inner.get(&key).await.unwrap()).unwrap();
    snapshot["v"] = json!(999);
    snapshot["article"]["title"] = json!("stale");
    ctx.cache
        .inner
        .set(&key, serde_json::to_vec(&snapshot).unwrap(), 60)
        .await
        .unwrap();

    let body = ctx.api("GET", &path).await;
    assert_eq!(body["data"]["title"], "real");

    let rewritten: Value = serde_json::from_slice(&ctx.cache.inner.get(&key).await.unwrap()).unwrap();
    assert_eq!(rewritten["v"], 1);
}

#[tokio::test]
async fn test_tag_edit_invalidates_embedding_articles() {
    let ctx = TestContext::new();
    let tag_id = ctx.create_tag("golang").await;
    let id = ctx.create_article(tag_id, "Goroutines").await;
    let path = format!("/api/v1/articles/{}", id);
    assert_eq!(ctx.api("GET", &path).await["data"]["tag"]["name"], "golang");

    let body = ctx
        .api("PUT", &format!("/api/v1/tags/{}?name=go&modified_by=admin", tag_id))
        .await;
    assert_eq!(body["code"], 200);

    assert_eq!(ctx.api("GET", &path).await["data"]["tag"]["name"], "go");
}

#[tokio::test]
async fn test_tag_update_errors() {
    let ctx = TestContext::new();
    ctx.create_tag("golang").await;
    let rust = ctx.create_tag("rust").await;

    let taken = ctx
        .api("PUT", &format!("/api/v1/tags/{}?name=golang&modified_by=admin", rust))
        .await;
    assert_eq!(taken["code"], 10001);

    let missing = ctx.api("PUT", "/api/v1/tags/99?name=x&modified_by=admin").await;
    assert_eq!(missing["code"], 10003);

    let no_modifier = ctx.api("PUT", &format!("/api/v1/tags/{}?name=x", rust)).await;
    assert_eq!(no_modifier["code"], 400);
}

#[tokio::test]
async fn test_tag_delete_guarded_while_in_use() {
    let ctx = TestContext::new();
    let tag_id = ctx.create_tag("golang").await;
    let id = ctx.create_article(tag_id, "pinned").await;
    let tag_path = format!("/api/v1/tags/{}", tag_id);

    let body = ctx.api("DELETE", &tag_path).await;
    assert_eq!(body["code"], 10002);

    ctx.api("DELETE", &format!("/api/v1/articles/{}", id)).await;
    assert_eq!(ctx.api("DELETE", &tag_path).await["code"], 200);
    assert_eq!(ctx.api("DELETE", &tag_path).await["code"], 10003);
}
