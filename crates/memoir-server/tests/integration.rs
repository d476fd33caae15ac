//! Integration tests for the HTTP surface.
//!
//! Each test spins up a real server on a random port so that
//! `ConnectInfo<SocketAddr>` is populated the same way it is in
//! production. The pipeline runs over in-memory fakes.

use memoir_core::{MemoryPipeline, PipelineOptions};
use memoir_server::{AppState, RateLimiter, create_router};
use memoir_test_utils::{InMemoryStore, StubEmbedder, StubGenerator};
use std::net::SocketAddr;
use std::sync::Arc;

/// Start a test server and return its base URL.
async fn start_test_server(rate_limit_rpm: u32) -> String {
    let pipeline = MemoryPipeline::new(
        Arc::new(StubEmbedder::new(8)),
        Arc::new(InMemoryStore::new()),
        Arc::new(StubGenerator::new("stub reply")),
        PipelineOptions::default(),
    );
    let state = Arc::new(AppState::new(
        pipeline,
        RateLimiter::new(rate_limit_rpm),
        5,
    ));
    let router = create_router(state, &["*".to_string()]);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    format!("http://{addr}")
}

async fn post_json(base: &str, path: &str, json: &str) -> (u16, serde_json::Value) {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}{path}"))
        .header("content-type", "application/json")
        .body(json.to_string())
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap();
    let value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let base = start_test_server(60).await;
    let resp = reqwest::get(format!("{base}/api/health")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn chat_returns_response_and_context() {
    let base = start_test_server(60).await;
    let (status, body) = post_json(
        &base,
        "/api/chat",
        r#"{"user_id": "u1", "message": "hello memory"}"#,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["response"], "stub reply");
    // The user turn is persisted before retrieval, so it comes back as
    // its own context.
    let context = body["context"].as_array().unwrap();
    assert_eq!(context.len(), 1);
    assert_eq!(context[0]["text"], "hello memory");
    assert_eq!(context[0]["role"], "user");
    assert!(context[0]["score"].as_f64().unwrap() > 0.0);
    assert!(body["latency_ms"].is_u64());
}

#[tokio::test]
async fn chat_rejects_out_of_bounds_top_k() {
    let base = start_test_server(60).await;
    for top_k in ["0", "51"] {
        let (status, _) = post_json(
            &base,
            "/api/chat",
            &format!(r#"{{"user_id": "u1", "message": "hi", "top_k": {top_k}}}"#),
        )
        .await;
        assert_eq!(status, 422, "top_k={top_k} should be rejected");
    }
}

#[tokio::test]
async fn chat_rejects_blank_fields() {
    let base = start_test_server(60).await;
    let (status, _) = post_json(&base, "/api/chat", r#"{"user_id": "", "message": "hi"}"#).await;
    assert_eq!(status, 422);
    let (status, _) = post_json(&base, "/api/chat", r#"{"user_id": "u1", "message": "  "}"#).await;
    assert_eq!(status, 422);
}

#[tokio::test]
async fn ingest_seeds_memories_for_later_chat() {
    let base = start_test_server(60).await;
    let (status, body) = post_json(
        &base,
        "/api/ingest",
        r#"{"user_id": "u2", "items": [{"text": "I own a red bike"}, {"text": "noted", "role": "assistant"}]}"#,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["upserted"], 2);

    let (status, body) = post_json(
        &base,
        "/api/chat",
        r#"{"user_id": "u2", "message": "what do I own?", "top_k": 10}"#,
    )
    .await;
    assert_eq!(status, 200);
    let texts: Vec<&str> = body["context"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["text"].as_str())
        .collect();
    assert!(texts.contains(&"I own a red bike"));
}

#[tokio::test]
async fn ingest_rejects_unknown_role() {
    let base = start_test_server(60).await;
    let (status, _) = post_json(
        &base,
        "/api/ingest",
        r#"{"user_id": "u3", "items": [{"text": "x", "role": "system"}]}"#,
    )
    .await;
    assert_eq!(status, 422);
}

#[tokio::test]
async fn requests_over_budget_get_429() {
    let base = start_test_server(2).await;
    let (status, _) = post_json(&base, "/api/chat", r#"{"user_id": "u4", "message": "a"}"#).await;
    assert_eq!(status, 200);
    let (status, _) = post_json(&base, "/api/chat", r#"{"user_id": "u4", "message": "b"}"#).await;
    assert_eq!(status, 200);
    let (status, _) = post_json(&base, "/api/chat", r#"{"user_id": "u4", "message": "c"}"#).await;
    assert_eq!(status, 429);
}

#[tokio::test]
async fn namespaces_do_not_leak_between_users() {
    let base = start_test_server(60).await;
    post_json(
        &base,
        "/api/ingest",
        r#"{"user_id": "alice", "items": [{"text": "alice's secret"}]}"#,
    )
    .await;

    let (status, body) = post_json(
        &base,
        "/api/chat",
        r#"{"user_id": "bob", "message": "any secrets?"}"#,
    )
    .await;
    assert_eq!(status, 200);
    let texts: Vec<&str> = body["context"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["text"].as_str())
        .collect();
    assert!(!texts.contains(&"alice's secret"));
}
