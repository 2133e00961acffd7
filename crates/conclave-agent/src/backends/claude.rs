use super::{send_json, LlmBackend};
use crate::config::ModelConfig;
use crate::llm::{LlmResponse, TokenUsage};
use conclave_core::{BackendErrorKind, ConclaveError, ConclaveResult, Message, Role};
use async_trait::async_trait;
use serde::Serialize;

/// Claude (Anthropic) API backend.
pub struct ClaudeBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl ClaudeBackend {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmBackend for ClaudeBackend {
    async fn chat(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
    ) -> ConclaveResult<LlmResponse> {
        let url = format!("{}/v1/messages", self.config.base_url());

        let api_messages: Vec<ClaudeMessage<'_>> = messages
            .iter()
            .filter_map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::System => return None,
                };
                Some(ClaudeMessage {
                    role,
                    content: &m.content,
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": api_messages,
        });

        if let Some(sys) = system_prompt {
            body["system"] = serde_json::json!(sys);
        }

        let request = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json");

        let resp_body = send_json(request, &body, "Claude").await?;
        parse_claude_response(&resp_body)
    }
}

// -- Claude wire types --

#[derive(Serialize)]
struct ClaudeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

pub fn parse_claude_response(body: &serde_json::Value) -> ConclaveResult<LlmResponse> {
    let content = body["content"].as_array().ok_or_else(|| {
        ConclaveError::backend(
            BackendErrorKind::Malformed,
            "Missing content in Claude response",
        )
    })?;

    let text_parts: Vec<&str> = content
        .iter()
        .filter(|block| block["type"].as_str() == Some("text"))
        .filter_map(|block| block["text"].as_str())
        .collect();

    let stop_reason = body["stop_reason"].as_str().map(str::to_string);
    if stop_reason.as_deref() == Some("refusal") {
        return Err(ConclaveError::backend(
            BackendErrorKind::Model,
            "Claude refused to generate a response",
        ));
    }

    let text = text_parts.join("\n");
    if text.trim().is_empty() {
        return Err(ConclaveError::backend(
            BackendErrorKind::Malformed,
            "Claude response contained no text",
        ));
    }

    Ok(LlmResponse {
        text,
        stop_reason,
        usage: TokenUsage {
            input_tokens: body["usage"]["input_tokens"].as_u64().unwrap_or(0),
            output_tokens: body["usage"]["output_tokens"].as_u64().unwrap_or(0),
        },
    })
}
