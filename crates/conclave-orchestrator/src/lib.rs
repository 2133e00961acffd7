//! Multi-agent pipeline orchestration for Conclave.
//!
//! A [`MultiAgentSystem`] owns one agent per [`AgentRole`] and runs every
//! submitted task through the same fixed path:
//!
//! ```text
//! coordinator (decompose) → researcher → implementer → critic → coordinator (synthesize)
//! ```
//!
//! Each stage's prompt embeds the full output of the stage before it.
//!
//! # Main types
//!
//! - [`MultiAgentSystem`]: Task lifecycle and stage sequencing.
//! - [`TaskRecord`]: One submitted task, its status, and its stage outputs.
//! - [`PipelineConfig`]: Context sharing, failure handling, window, and deadline.
//! - [`AgentMonitor`]: Per-role state and call metrics.
//! - [`AgentProfile`]: System prompt and model settings bound to a role.

/// Pipeline configuration.
pub mod config;
/// The orchestration engine.
pub mod engine;
/// Agent state and metrics monitoring.
pub mod monitor;
/// Default agent profiles and role prompts.
pub mod profiles;
/// Shared orchestration types (TaskRecord, Stage, AgentProfile, etc.).
pub mod types;

pub use config::{ContextMode, FailureMode, PipelineConfig};
pub use conclave_core::AgentRole;
pub use engine::{BackendFactory, MultiAgentSystem};
pub use monitor::AgentMonitor;
pub use profiles::default_profiles;
pub use types::{
    AgentMetrics, AgentProfile, AgentState, Stage, StageOutput, TaskRecord, TaskStatus,
    WorkerStatus,
};
