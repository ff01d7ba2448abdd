//! End-to-end tests against a spawned server.

mod common;

use common::TestApp;
use genai_relay::services::providers::mock::MockProvider;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::spawn(Arc::new(MockProvider::new())).await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "genai-relay");
}

#[tokio::test]
async fn generate_round_trip_over_http() {
    let provider = Arc::new(MockProvider::new().with_text("Hello from upstream"));
    let app = TestApp::spawn(provider.clone()).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/generate", app.address))
        .json(&serde_json::json!({ "prompt": "Say hello" }))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, serde_json::json!({ "generatedText": "Hello from upstream" }));
    assert_eq!(provider.generate_calls(), 1);
}

#[tokio::test]
async fn permissive_cors_allows_any_origin() {
    let app = TestApp::spawn(Arc::new(MockProvider::new())).await;
    let client = Client::new();

    let response = client
        .get(format!("{}/models", app.address))
        .header("Origin", "https://anywhere.example")
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
