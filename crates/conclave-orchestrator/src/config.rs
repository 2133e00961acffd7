use conclave_agent::DEFAULT_HISTORY_WINDOW;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether tasks share one agent set or each get their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// One agent per role for the orchestrator's lifetime. History
    /// accumulates across tasks and submissions run one at a time.
    #[default]
    Shared,
    /// Fresh agents per submission. Submissions may run concurrently.
    Isolated,
}

/// What a stage failure does to the task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Substitute placeholder text and keep going; the task still completes.
    #[default]
    Degraded,
    /// Halt at the first failure and mark the task failed.
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub context_mode: ContextMode,
    #[serde(default)]
    pub failure_mode: FailureMode,
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Per-stage backend deadline; 0 disables it.
    #[serde(default = "default_stage_timeout_secs")]
    pub stage_timeout_secs: u64,
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

fn default_stage_timeout_secs() -> u64 {
    120
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context_mode: ContextMode::default(),
            failure_mode: FailureMode::default(),
            history_window: default_history_window(),
            stage_timeout_secs: default_stage_timeout_secs(),
        }
    }
}

impl PipelineConfig {
    pub fn stage_timeout(&self) -> Option<Duration> {
        (self.stage_timeout_secs > 0).then(|| Duration::from_secs(self.stage_timeout_secs))
    }
}
