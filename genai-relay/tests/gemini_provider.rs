//! Gemini provider against a mock upstream.

mod common;

use common::{TEST_API_KEY, TEST_MODEL};
use genai_relay::models::ErrorEnvelope;
use genai_relay::services::providers::gemini::{GeminiConfig, GeminiProvider};
use genai_relay::services::{GenerativeProvider, ProviderError};
use secrecy::Secret;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new(GeminiConfig {
        api_key: Secret::new(TEST_API_KEY.to_string()),
        model: TEST_MODEL.to_string(),
        api_base: server.uri(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn generate_path() -> String {
    format!("/models/{}:generateContent", TEST_MODEL)
}

#[tokio::test]
async fn generate_sends_prompt_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(header("x-goog-api-key", TEST_API_KEY))
        .and(body_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Write a haiku" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Autumn moonlight" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 3, "candidatesTokenCount": 4 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = provider(&server).generate("Write a haiku").await.unwrap();

    assert_eq!(text, "Autumn moonlight");
}

#[tokio::test]
async fn generate_error_keeps_upstream_payload() {
    let server = MockServer::start().await;
    let upstream_error = json!({
        "error": {
            "code": 400,
            "message": "API key not valid. Please pass a valid API key.",
            "status": "INVALID_ARGUMENT"
        }
    });
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(400).set_body_json(upstream_error.clone()))
        .mount(&server)
        .await;

    let err = provider(&server).generate("hi").await.unwrap_err();

    assert_eq!(
        err,
        ProviderError::Api {
            status: 400,
            message: "API key not valid. Please pass a valid API key.".to_string(),
            payload: upstream_error.clone(),
        }
    );

    let envelope = ErrorEnvelope::from_upstream(&err);
    assert_eq!(
        envelope.details,
        "API key not valid. Please pass a valid API key."
    );
    assert_eq!(envelope.full_error, Some(upstream_error["error"].clone()));
}

#[tokio::test]
async fn generate_error_with_text_body_is_serialized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = provider(&server).generate("hi").await.unwrap_err();

    assert_eq!(err.response_payload(), Some(&json!("upstream unavailable")));
    assert_eq!(
        ErrorEnvelope::from_upstream(&err).details,
        r#""upstream unavailable""#
    );
}

#[tokio::test]
async fn unreachable_upstream_is_a_network_error() {
    // Nothing listens on a port we bound and released.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let api_base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let provider = GeminiProvider::new(GeminiConfig {
        api_key: Secret::new(TEST_API_KEY.to_string()),
        model: TEST_MODEL.to_string(),
        api_base,
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let err = provider.generate("hi").await.unwrap_err();

    assert!(matches!(err, ProviderError::NetworkError(_)));
    let envelope = ErrorEnvelope::from_upstream(&err);
    assert!(envelope.details.starts_with("Network error:"));
    assert!(!envelope.details.contains(TEST_API_KEY));
}

#[tokio::test]
async fn list_models_follows_pagination_in_order() {
    let server = MockServer::start().await;

    // Mounted first so it wins over the unqualified first-page mock.
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{ "name": "models/gemini-2.5-pro", "displayName": "Gemini 2.5 Pro" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("x-goog-api-key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {
                    "name": "models/gemini-2.5-flash",
                    "displayName": "Gemini 2.5 Flash",
                    "supportedGenerationMethods": ["generateContent", "countTokens"],
                    "inputTokenLimit": 1048576,
                    "outputTokenLimit": 65536,
                    "version": "001",
                    "temperature": 1.0
                }
            ],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let models = provider(&server).list_models().await.unwrap();

    let names: Vec<_> = models.iter().filter_map(|m| m.name.as_deref()).collect();
    assert_eq!(names, vec!["models/gemini-2.5-flash", "models/gemini-2.5-pro"]);
    assert_eq!(models[0].input_token_limit, Some(1048576));
    assert!(models[0].extra.contains_key("temperature"));
}

#[tokio::test]
async fn list_models_stops_when_page_tokens_cycle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(query_param("pageToken", "a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{ "name": "models/second" }],
            "nextPageToken": "b"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(query_param("pageToken", "b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{ "name": "models/third" }],
            "nextPageToken": "a"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{ "name": "models/first" }],
            "nextPageToken": "a"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let models = provider(&server).list_models().await.unwrap();

    let names: Vec<_> = models.iter().filter_map(|m| m.name.as_deref()).collect();
    assert_eq!(names, vec!["models/first", "models/second", "models/third"]);
}

#[tokio::test]
async fn list_models_error_message_comes_from_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    let err = provider(&server).list_models().await.unwrap_err();

    let envelope = ErrorEnvelope::list_models_failure(&err);
    assert_eq!(envelope.error, "Failed to list models");
    assert_eq!(envelope.details, "Upstream API error 403: Permission denied");
    assert_eq!(envelope.full_error, None);
}
