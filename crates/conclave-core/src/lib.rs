//! Core types and error definitions for Conclave.
//!
//! This crate provides the types shared by every Conclave crate: the unified
//! error enum and the message representation stored in agent histories.
//!
//! # Main types
//!
//! - [`ConclaveError`]: Unified error enum for all Conclave subsystems.
//! - [`ConclaveResult`]: Convenience alias for `Result<T, ConclaveError>`.
//! - [`BackendErrorKind`]: Classification of inference backend failures.
//! - [`Role`]: Message role (user, assistant, system).
//! - [`Message`]: A single entry in an agent's conversation history.
//! - [`AgentRole`]: The four fixed roles of the pipeline.

/// Error types.
pub mod error;
/// Conversation message types.
pub mod message;
/// The closed set of agent roles.
pub mod role;

pub use error::{BackendErrorKind, ConclaveError, ConclaveResult};
pub use message::{Message, Role};
pub use role::AgentRole;
