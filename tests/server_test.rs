// Integration tests for HTTP server

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sentibot::chat::ChatEngine;
use sentibot::config::Config;
use sentibot::providers::NullCompletionClient;
use sentibot::server::ChatServer;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(config: Config) -> Router {
    let engine = ChatEngine::with_client(&config, Arc::new(NullCompletionClient::default())).unwrap();
    ChatServer::new(config, engine).into_router()
}

fn app() -> Router {
    app_with(Config::default())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["active_sessions"], 0);
}

#[tokio::test]
async fn test_classify_endpoint() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json("/v1/classify", json!({"text": "I feel annoyed and irritated"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "angry");
    assert_eq!(body["id"], 2);
    assert_eq!(body["label"], "Angry");
    assert!((body["confidence"].as_f64().unwrap() - 0.4).abs() < 1e-9);
    assert_eq!(body["normalized"], "feel annoyed irritated");
}

#[tokio::test]
async fn test_chat_creates_session_and_falls_back() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json("/v1/chat", json!({"message": "I am so happy and excited today"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["emotion"], "happy");
    assert_eq!(body["source"], "fallback");
    assert_eq!(
        body["reply"],
        "That's wonderful! I'm really glad you're feeling good. Your positive energy is contagious! 😊"
    );
    assert!(!body["session_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let app = app();
    let (status, body) = send(&app, post_json("/v1/chat", json!({"message": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = app();

    let (_, first) = send(&app, post_json("/v1/chat", json!({"message": "I am so sad"}))).await;
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let (_, second) = send(
        &app,
        post_json("/v1/chat", json!({"message": "wow, shocked", "session_id": session_id})),
    )
    .await;
    assert_eq!(second["session_id"], session_id.as_str());

    let (status, snapshot) = send(&app, get(&format!("/v1/session/{}", session_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["message_count"], 4);
    assert_eq!(snapshot["turns"][0]["speaker"], "user");
    assert_eq!(snapshot["turns"][0]["emotion"], "sad");
    assert_eq!(snapshot["turns"][1]["speaker"], "bot");
    assert_eq!(snapshot["emotion_breakdown"].as_array().unwrap().len(), 2);

    let reset = Request::builder()
        .method("POST")
        .uri(format!("/v1/session/{}/reset", session_id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, reset).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, snapshot) = send(&app, get(&format!("/v1/session/{}", session_id))).await;
    assert_eq!(snapshot["message_count"], 0);
    assert_eq!(snapshot["total_user_turns"], 2);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/session/{}", session_id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, get(&format!("/v1/session/{}", session_id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "not_found_error");
}

#[tokio::test]
async fn test_unknown_session_routes_are_404() {
    let app = app();
    let reset = Request::builder()
        .method("POST")
        .uri("/v1/session/nope/reset")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, reset).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let delete = Request::builder()
        .method("DELETE")
        .uri("/v1/session/nope")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_limit_returns_503() {
    let mut config = Config::default();
    config.server.max_sessions = 1;
    let app = app_with(config);

    let (status, _) = send(&app, post_json("/v1/chat", json!({"message": "hello"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, post_json("/v1/chat", json!({"message": "hello again"}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"]["message"].as_str().unwrap().contains("Maximum session limit"));
}

#[tokio::test]
async fn test_status_and_metrics() {
    let app = app();
    send(&app, post_json("/v1/chat", json!({"message": "I am furious"}))).await;

    let (status, body) = send(&app, get("/v1/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remote_enabled"], false);
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(body["environment"], "development");
    assert_eq!(body["max_retries"], 3);
    assert_eq!(body["active_sessions"], 1);

    let response = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("sentibot_turns_total{emotion=\"angry\"} 1"));
    assert!(text.contains("sentibot_replies_total{source=\"fallback\"} 1"));
}
