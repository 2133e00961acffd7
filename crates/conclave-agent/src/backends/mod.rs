pub mod claude;
pub mod openai;

use crate::llm::LlmResponse;
use conclave_core::{BackendErrorKind, ConclaveError, ConclaveResult, Message};
use async_trait::async_trait;

/// Trait for LLM provider backends.
///
/// A request is the role's system prompt plus an ordered slice of history;
/// the model identifier and output bound come from the backend's own
/// [`ModelConfig`](crate::ModelConfig).
///
/// To add a new provider:
/// 1. Create a new module in `backends/`
/// 2. Implement `LlmBackend` for your struct
/// 3. Add the variant to `LlmProvider` enum in `config.rs`
/// 4. Wire it up in `LlmClient::new()` in `llm.rs`
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Non-streaming chat completion.
    async fn chat(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
    ) -> ConclaveResult<LlmResponse>;
}

/// Send a JSON request and return the decoded body of a successful response.
///
/// Transport failures and non-success statuses are classified into
/// [`BackendErrorKind`]s; `provider` only labels the error text.
pub(crate) async fn send_json(
    request: reqwest::RequestBuilder,
    body: &serde_json::Value,
    provider: &str,
) -> ConclaveResult<serde_json::Value> {
    let resp = request.json(body).send().await.map_err(|e| {
        let kind = if e.is_timeout() {
            BackendErrorKind::Timeout
        } else {
            BackendErrorKind::Transport
        };
        ConclaveError::backend(kind, e.to_string())
    })?;

    let status = resp.status();
    if !status.is_success() {
        let error_body = resp
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(ConclaveError::backend(
            BackendErrorKind::from_status(status.as_u16()),
            format!("{provider} API error {status}: {error_body}"),
        ));
    }

    resp.json().await.map_err(|e| {
        ConclaveError::backend(
            BackendErrorKind::Malformed,
            format!("{provider} response is not JSON: {e}"),
        )
    })
}
