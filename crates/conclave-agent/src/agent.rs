use crate::context::ConversationBuffer;
use crate::llm::{LlmClient, LlmResponse};
use conclave_core::{AgentRole, BackendErrorKind, ConclaveError, ConclaveResult, Message};
use std::time::Duration;
use tracing::{debug, warn};

/// Number of history entries sent with each request unless configured otherwise.
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// A role-scoped conversational agent.
///
/// Owns its history for its whole lifetime. Every exchange appends exactly
/// one user entry before the backend call and one assistant entry after it,
/// except when [`Agent::exchange`] fails, which leaves only the user entry.
pub struct Agent {
    role: AgentRole,
    system_prompt: String,
    history: ConversationBuffer,
    llm: LlmClient,
    window: usize,
    timeout: Option<Duration>,
}

impl Agent {
    /// Create an agent with an empty history and the default window.
    pub fn new(role: AgentRole, system_prompt: impl Into<String>, llm: LlmClient) -> Self {
        Self {
            role,
            system_prompt: system_prompt.into(),
            history: ConversationBuffer::new(),
            llm,
            window: DEFAULT_HISTORY_WINDOW,
            timeout: None,
        }
    }

    /// Number of most recent history entries included in each request.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Deadline for a single backend call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The role this agent plays.
    pub fn role(&self) -> AgentRole {
        self.role
    }

    /// Prompt sent ahead of every request.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Everything this agent has exchanged so far.
    pub fn history(&self) -> &ConversationBuffer {
        &self.history
    }

    /// Send `input` and return the generated text.
    ///
    /// Backend failures are returned as [`ConclaveError::Backend`].
    pub async fn process(&mut self, input: &str) -> ConclaveResult<String> {
        self.exchange(input).await.map(|resp| resp.text)
    }

    /// Send `input`, turning any failure into placeholder text.
    ///
    /// The placeholder (`"Error processing message: <details>"`) is recorded
    /// in history and returned as if the model had produced it.
    pub async fn process_degraded(&mut self, input: &str) -> String {
        match self.exchange(input).await {
            Ok(resp) => resp.text,
            Err(e) => self.record_failure(&e),
        }
    }

    /// Send `input` and return the full backend response.
    pub async fn exchange(&mut self, input: &str) -> ConclaveResult<LlmResponse> {
        self.history.append(Message::user(input));

        let window = self.history.windowed(self.window);
        debug!(
            role = %self.role,
            history = self.history.len(),
            window = window.len(),
            estimated_tokens = self.history.estimated_tokens(self.window),
            "Sending request to backend"
        );

        let request = self.llm.chat(Some(&self.system_prompt), window);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, request).await {
                Ok(result) => result,
                Err(_) => Err(ConclaveError::backend(
                    BackendErrorKind::Timeout,
                    format!("no response within {} ms", limit.as_millis()),
                )),
            },
            None => request.await,
        };

        match result {
            Ok(resp) => {
                self.history.append(Message::assistant(&resp.text));
                Ok(resp)
            }
            Err(e) => {
                warn!(role = %self.role, error = %e, "Backend call failed");
                Err(e)
            }
        }
    }

    /// Record `error` as the reply to the pending input and return the placeholder text.
    pub fn record_failure(&mut self, error: &ConclaveError) -> String {
        let text = format!("Error processing message: {error}");
        self.history.append(Message::assistant(&text));
        text
    }
}
