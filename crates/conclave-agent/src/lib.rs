//! Agents, conversation history, and inference backends for Conclave.
//!
//! An [`Agent`] wraps one role-scoped system prompt, a
//! [`ConversationBuffer`], and an [`LlmClient`]. Each call to
//! [`Agent::process`] appends the input to history, sends the system prompt
//! plus a bounded window of that history to the backend, and records the
//! reply.

/// Role-scoped conversational agent.
pub mod agent;
/// LLM backend implementations (Claude, OpenAI-compatible).
pub mod backends;
/// Provider and model configuration.
pub mod config;
/// Conversation history and windowing.
pub mod context;
/// Provider-dispatching LLM client.
pub mod llm;

pub use agent::{Agent, DEFAULT_HISTORY_WINDOW};
pub use config::{LlmProvider, ModelConfig};
pub use context::ConversationBuffer;
pub use llm::{LlmClient, LlmResponse, TokenUsage};
