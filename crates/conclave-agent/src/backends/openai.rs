use super::{send_json, LlmBackend};
use crate::config::{LlmProvider, ModelConfig};
use crate::llm::{LlmResponse, TokenUsage};
use conclave_core::{BackendErrorKind, ConclaveError, ConclaveResult, Message, Role};
use async_trait::async_trait;

/// OpenAI-compatible API backend.
///
/// Works with OpenAI, OpenRouter, Groq, and any other provider that
/// implements the OpenAI chat completions API.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn build_messages(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
    ) -> Vec<serde_json::Value> {
        let mut api_messages: Vec<serde_json::Value> = Vec::with_capacity(messages.len() + 1);

        if let Some(sys) = system_prompt {
            api_messages.push(serde_json::json!({
                "role": "system",
                "content": sys
            }));
        }

        for m in messages {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => continue,
            };
            api_messages.push(serde_json::json!({
                "role": role,
                "content": m.content
            }));
        }

        api_messages
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter asks for attribution headers
        if matches!(self.config.provider, LlmProvider::OpenRouter) {
            request
                .header("HTTP-Referer", "https://github.com/conclave-rs/conclave")
                .header("X-Title", "Conclave")
        } else {
            request
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn chat(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
    ) -> ConclaveResult<LlmResponse> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());

        let body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": self.build_messages(system_prompt, messages),
        });

        let request = self.add_provider_headers(self.http.post(&url));
        let resp_body = send_json(request, &body, "OpenAI").await?;
        parse_openai_response(&resp_body)
    }
}

pub fn parse_openai_response(body: &serde_json::Value) -> ConclaveResult<LlmResponse> {
    let choice = &body["choices"][0];
    if choice.is_null() {
        return Err(ConclaveError::backend(
            BackendErrorKind::Malformed,
            "No choices in OpenAI response",
        ));
    }

    let message = &choice["message"];
    let text = match message["content"].as_str() {
        Some(text) => text.to_string(),
        None => {
            let detail = message["refusal"]
                .as_str()
                .unwrap_or("Missing message content in OpenAI response");
            let kind = if message["refusal"].is_string() {
                BackendErrorKind::Model
            } else {
                BackendErrorKind::Malformed
            };
            return Err(ConclaveError::backend(kind, detail));
        }
    };
    if text.trim().is_empty() {
        return Err(ConclaveError::backend(
            BackendErrorKind::Malformed,
            "OpenAI response contained no text",
        ));
    }

    Ok(LlmResponse {
        text,
        stop_reason: choice["finish_reason"].as_str().map(str::to_string),
        usage: TokenUsage {
            input_tokens: body["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
            output_tokens: body["usage"]["completion_tokens"].as_u64().unwrap_or(0),
        },
    })
}
