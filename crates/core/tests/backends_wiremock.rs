use std::time::Duration;

use collab_core::backend::{GeminiBackend, GenerationBackend, OllamaBackend};
use collab_core::models::ModelConfig;
use collab_core::BackendError;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn ollama_returns_response_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "model": "llama3", "stream": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "response": "{\"title\": \"Hi\"}",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(server.uri(), "llama3", Duration::from_secs(5)).unwrap();
    let text = backend.generate("PLANNING TASK: hello").await.unwrap();
    assert_eq!(text, "{\"title\": \"Hi\"}");
}

#[tokio::test]
async fn ollama_server_error_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(server.uri(), "llama3", Duration::from_secs(5)).unwrap();
    match backend.generate("hello").await {
        Err(BackendError::Unavailable(message)) => {
            assert!(message.contains("500"));
            assert!(message.contains("model not loaded"));
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn ollama_health_check_uses_tags_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(server.uri(), "llama3", Duration::from_secs(5)).unwrap();
    assert_ok!(backend.health_check().await);
}

#[tokio::test]
async fn ollama_unreachable_host_is_unavailable() {
    let backend = OllamaBackend::new("http://127.0.0.1:9", "llama3", Duration::from_secs(2)).unwrap();
    let err = assert_err!(backend.health_check().await);
    assert_eq!(err.code(), "backend_unavailable");
}

#[tokio::test]
async fn gemini_sends_key_header_and_joins_parts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "Hello, " }, { "text": "world" }]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = GeminiBackend::new(
        "test-key",
        "gemini-2.5-flash",
        Some(server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();

    assert_eq!(backend.generate("WRITING TASK: greet").await.unwrap(), "Hello, world");
}

#[tokio::test]
async fn gemini_without_candidates_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let backend = GeminiBackend::new(
        "test-key",
        "gemini-2.5-flash",
        Some(server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();

    assert!(matches!(
        backend.generate("hello").await,
        Err(BackendError::Unavailable(_))
    ));
}

#[tokio::test]
async fn gemini_rate_limit_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let backend = GeminiBackend::new(
        "test-key",
        "gemini-2.5-flash",
        Some(server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();

    match backend.generate("hello").await {
        Err(BackendError::Unavailable(message)) => assert!(message.contains("429")),
        other => panic!("expected Unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn model_config_builds_local_backend_against_mock() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let config = ModelConfig::from_lookup(|key| match key {
        "OLLAMA_BASE_URL" => Some(uri.clone()),
        "OLLAMA_MODEL" => Some("tiny".to_string()),
        _ => None,
    });
    let backend = config.create_backend().unwrap();

    assert_eq!(backend.name(), "ollama");
    assert_eq!(backend.model(), "tiny");
    assert_eq!(backend.generate("hi").await.unwrap(), "ok");
}
