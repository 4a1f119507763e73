//! Integration tests
//!
//! Drive the full router against a mocked chat completion API

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokenmeter::config::Settings;
use tokenmeter::handlers::create_router;
use tower::ServiceExt;

const API_KEY: &str = "sk-test-key-for-integration-testing-1234567890";

/// Create test settings pointing at `base_url`
fn create_test_settings(base_url: &str, overrides: &[(&str, &str)]) -> Settings {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("OPENAI_API_KEY".to_string(), API_KEY.to_string()),
        ("OPENAI_BASE_URL".to_string(), base_url.to_string()),
        ("SERVER_HOST".to_string(), "127.0.0.1".to_string()),
        ("SERVER_PORT".to_string(), "8083".to_string()),
        ("OPENAI_TEMPERATURE".to_string(), "0.7".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    Settings::from_lookup(|key| vars.get(key).cloned()).expect("Failed to create test settings")
}

fn create_app(base_url: &str) -> Router {
    create_router(create_test_settings(base_url, &[])).expect("Failed to create router")
}

fn completion_body() -> Value {
    json!({
        "id": "chatcmpl-9xYz",
        "object": "chat.completion",
        "created": 1718000000,
        "model": "gpt-4o-mini-2024-07-18",
        "system_fingerprint": "fp_0ba0d124f1",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "Java was originally called Oak, after a tree outside James Gosling's office.",
                "refusal": null
            },
            "logprobs": null,
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 14,
            "completion_tokens": 19,
            "total_tokens": 33,
            "completion_tokens_details": {"reasoning_tokens": 0}
        }
    })
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, content_type, body.to_vec())
}

#[tokio::test]
async fn test_root_returns_plain_text() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", format!("Bearer {}", API_KEY))
                .json_body_partial(
                    r#"{"model":"gpt-4o-mini","messages":[{"role":"user","content":"Tell me a fun fact about Java"}]}"#,
                );
            then.status(200).json_body(completion_body());
        })
        .await;

    let (status, content_type, body) = get(create_app(&server.url("/v1")), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "Java was originally called Oak, after a tree outside James Gosling's office."
    );
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_tokens_returns_upstream_object_verbatim() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(completion_body());
        })
        .await;

    let (status, content_type, body) = get(create_app(&server.url("/v1")), "/tokens").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("application/json"));
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, completion_body());
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_tokens_custom_mirrors_upstream_usage() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(completion_body());
        })
        .await;

    let (status, _, body) = get(create_app(&server.url("/v1")), "/tokens-custom").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json,
        json!({
            "content": "Java was originally called Oak, after a tree outside James Gosling's office.",
            "usage": {"promptTokens": 14, "completionTokens": 19, "totalTokens": 33}
        })
    );
}

#[tokio::test]
async fn test_tokens_custom_without_upstream_usage_reports_zeros() {
    let server = MockServer::start_async().await;
    let mut body = completion_body();
    body.as_object_mut().unwrap().remove("usage");
    server
        .mock_async(move |when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(body);
        })
        .await;

    let (status, _, body) = get(create_app(&server.url("/v1")), "/tokens-custom").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["usage"], json!({"promptTokens": 0, "completionTokens": 0, "totalTokens": 0}));
}

#[tokio::test]
async fn test_configured_prompt_and_model_are_sent() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .json_body_partial(
                    r#"{"model":"gpt-4o","max_tokens":64,"messages":[{"role":"user","content":"Tell me a fun fact about Rust"}]}"#,
                );
            then.status(200).json_body(completion_body());
        })
        .await;

    let settings = create_test_settings(
        &server.url("/v1"),
        &[
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_MAX_TOKENS", "64"),
            ("CHAT_PROMPT", "Tell me a fun fact about Rust"),
        ],
    );
    let app = create_router(settings).unwrap();

    let (status, _, _) = get(app, "/tokens-custom").await;

    assert_eq!(status, StatusCode::OK);
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_upstream_error_surfaces_as_server_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401).json_body(json!({
                "error": {
                    "message": "Incorrect API key provided",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": "invalid_api_key"
                }
            }));
        })
        .await;

    for uri in ["/", "/tokens", "/tokens-custom"] {
        let (status, _, body) = get(create_app(&server.url("/v1")), uri).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY, "endpoint {}", uri);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["type"], "upstream_error");
        assert_eq!(json["error"]["upstream_status"], 401);
        assert_eq!(
            json["error"]["message"],
            "External API error (401): Incorrect API key provided"
        );
    }
}

#[tokio::test]
async fn test_upstream_empty_choices_is_server_error() {
    let server = MockServer::start_async().await;
    let mut body = completion_body();
    body["choices"] = json!([]);
    server
        .mock_async(move |when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(body);
        })
        .await;

    let (status, _, body) = get(create_app(&server.url("/v1")), "/").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["type"], "invalid_upstream_response");
}

#[tokio::test]
async fn test_malformed_upstream_body_is_bad_gateway() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).body("not json");
        })
        .await;

    let (status, _, body) = get(create_app(&server.url("/v1")), "/tokens").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["type"], "invalid_upstream_response");
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    // Nothing listens on port 1
    let (status, _, body) = get(create_app("http://127.0.0.1:1/v1"), "/tokens-custom").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["type"], "upstream_unreachable");
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(completion_body());
        })
        .await;

    let settings = create_test_settings(&server.url("/v1"), &[("REQUEST_TIMEOUT", "1")]);
    let app = create_router(settings).unwrap();

    let (status, _, body) = get(app, "/tokens").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["type"], "timeout_error");
}

#[tokio::test]
async fn test_health_check_does_not_call_upstream() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(completion_body());
        })
        .await;

    let (status, _, body) = get(create_app(&server.url("/v1")), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "tokenmeter");
    assert_eq!(json["details"]["provider"], "openai");
    assert_eq!(json["details"]["model"], "gpt-4o-mini");
    assert!(json["timestamp"].is_string());
    upstream.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_liveness_check_endpoint() {
    let (status, _, body) = get(create_app("http://127.0.0.1:1/v1"), "/health/live").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "alive");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _, _) = get(create_app("http://127.0.0.1:1/v1"), "/v1/messages").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_restricted_origin() {
    let settings = create_test_settings(
        "http://127.0.0.1:1/v1",
        &[("ALLOWED_ORIGINS", "https://example.com")],
    );
    let app = create_router(settings).unwrap();

    let request = Request::builder()
        .uri("/health/live")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://example.com"
    );
}
