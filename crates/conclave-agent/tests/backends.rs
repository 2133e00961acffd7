//! HTTP backend tests against a local mock server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use conclave_agent::backends::claude::ClaudeBackend;
use conclave_agent::backends::openai::OpenAiBackend;
use conclave_agent::backends::LlmBackend;
use conclave_agent::{LlmProvider, ModelConfig};
use conclave_core::{BackendErrorKind, Message};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, provider: LlmProvider) -> ModelConfig {
    ModelConfig {
        provider,
        model_id: "test-model".to_string(),
        api_key: "test-key".to_string(),
        api_base_url: Some(server.uri()),
        temperature: 0.2,
        max_tokens: 256,
    }
}

#[tokio::test]
async fn test_claude_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "max_tokens": 256,
            "system": "You are the critic agent.",
            "messages": [{"role": "user", "content": "review this"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": [{"type": "text", "text": "Looks fine."}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 20, "output_tokens": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = ClaudeBackend::new(config_for(&server, LlmProvider::Claude));
    let resp = backend
        .chat(
            Some("You are the critic agent."),
            &[Message::user("review this")],
        )
        .await
        .unwrap();

    assert_eq!(resp.text, "Looks fine.");
    assert_eq!(resp.usage.output_tokens, 3);
}

#[tokio::test]
async fn test_claude_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let backend = ClaudeBackend::new(config_for(&server, LlmProvider::Claude));
    let err = backend.chat(None, &[Message::user("hi")]).await.unwrap_err();
    assert_eq!(err.backend_kind(), Some(BackendErrorKind::RateLimit));
    assert!(err.to_string().contains("slow down"));
}

#[tokio::test]
async fn test_claude_bad_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .mount(&server)
        .await;

    let backend = ClaudeBackend::new(config_for(&server, LlmProvider::Claude));
    let err = backend.chat(None, &[Message::user("hi")]).await.unwrap_err();
    assert_eq!(err.backend_kind(), Some(BackendErrorKind::Auth));
}

#[tokio::test]
async fn test_claude_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let backend = ClaudeBackend::new(config_for(&server, LlmProvider::Claude));
    let err = backend.chat(None, &[Message::user("hi")]).await.unwrap_err();
    assert_eq!(err.backend_kind(), Some(BackendErrorKind::Malformed));
}

#[tokio::test]
async fn test_openai_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "messages": [
                {"role": "system", "content": "You are the researcher agent."},
                {"role": "user", "content": "research"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Found three papers."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 30, "completion_tokens": 4}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new(config_for(&server, LlmProvider::OpenAi));
    let resp = backend
        .chat(
            Some("You are the researcher agent."),
            &[Message::user("research")],
        )
        .await
        .unwrap();
    assert_eq!(resp.text, "Found three papers.");
    assert_eq!(resp.usage.input_tokens, 30);
}

#[tokio::test]
async fn test_openrouter_sends_attribution_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("x-title", "Conclave"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"content": "ok"}, "finish_reason": "stop"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new(config_for(&server, LlmProvider::OpenRouter));
    let resp = backend.chat(None, &[Message::user("hi")]).await.unwrap();
    assert_eq!(resp.text, "ok");
}

#[tokio::test]
async fn test_openai_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new(config_for(&server, LlmProvider::Groq));
    let err = backend.chat(None, &[Message::user("hi")]).await.unwrap_err();
    assert_eq!(err.backend_kind(), Some(BackendErrorKind::Model));
}
