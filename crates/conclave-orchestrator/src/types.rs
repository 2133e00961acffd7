use chrono::{DateTime, Utc};
use conclave_agent::ModelConfig;
use conclave_core::AgentRole;
use serde::{Deserialize, Serialize};

/// One step of the fixed pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Coordinator breaks the task into subtasks.
    Decompose,
    /// Researcher gathers information, given the decomposition.
    Research,
    /// Implementer produces a solution, given the research.
    Implement,
    /// Critic reviews the solution.
    Review,
    /// Coordinator combines solution and review into the final answer.
    Synthesize,
}

impl Stage {
    /// Every stage, in execution order.
    pub const PIPELINE: [Stage; 5] = [
        Stage::Decompose,
        Stage::Research,
        Stage::Implement,
        Stage::Review,
        Stage::Synthesize,
    ];

    /// The agent that runs this stage.
    pub fn role(&self) -> AgentRole {
        match self {
            Stage::Decompose | Stage::Synthesize => AgentRole::Coordinator,
            Stage::Research => AgentRole::Researcher,
            Stage::Implement => AgentRole::Implementer,
            Stage::Review => AgentRole::Critic,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Decompose => write!(f, "decompose"),
            Stage::Research => write!(f, "research"),
            Stage::Implement => write!(f, "implement"),
            Stage::Review => write!(f, "review"),
            Stage::Synthesize => write!(f, "synthesize"),
        }
    }
}

/// Configuration for a specialized agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub role: AgentRole,
    pub model: ModelConfig,
    pub system_prompt: String,
}

/// Lifecycle of a [`TaskRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    New,
    InProgress,
    Completed,
    Failed { reason: String },
}

/// What one stage was asked and what it answered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    pub stage: Stage,
    pub role: AgentRole,
    pub prompt: String,
    pub content: String,
    /// The content is a placeholder standing in for a failed backend call.
    pub degraded: bool,
}

/// A task submitted to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub description: String,
    pub status: TaskStatus,
    pub result: Option<String>,
    pub stages: Vec<StageOutput>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            status: TaskStatus::New,
            result: None,
            stages: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Completed and failed records are frozen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            TaskStatus::Completed | TaskStatus::Failed { .. }
        )
    }

    pub fn start(&mut self) {
        if self.status == TaskStatus::New {
            self.status = TaskStatus::InProgress;
        }
    }

    pub fn record_stage(&mut self, output: StageOutput) {
        if !self.is_terminal() {
            self.stages.push(output);
        }
    }

    pub fn complete(&mut self, result: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.status = TaskStatus::Completed;
        self.result = Some(result.into());
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.status = TaskStatus::Failed {
            reason: reason.into(),
        };
        self.completed_at = Some(Utc::now());
    }

    /// Number of stages whose output is a failure placeholder.
    pub fn degraded_stages(&self) -> usize {
        self.stages.iter().filter(|s| s.degraded).count()
    }
}

/// Metrics tracked per agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub calls: u32,
    pub errors: u32,
    pub duration_ms: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Real-time snapshot of an agent's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub role: AgentRole,
    pub current_task: Option<String>,
    pub status: WorkerStatus,
    pub metrics: AgentMetrics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Idle,
    Working,
    Error,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stage_output(stage: Stage, degraded: bool) -> StageOutput {
        StageOutput {
            stage,
            role: stage.role(),
            prompt: "p".to_string(),
            content: "c".to_string(),
            degraded,
        }
    }

    #[test]
    fn test_task_creation() {
        let task = TaskRecord::new("task_1", "Write a parser");
        assert_eq!(task.status, TaskStatus::New);
        assert!(task.result.is_none());
        assert!(task.stages.is_empty());
        assert!(!task.is_terminal());
    }

    #[test]
    fn test_task_lifecycle() {
        let mut task = TaskRecord::new("task_1", "Write a parser");
        task.start();
        assert_eq!(task.status, TaskStatus::InProgress);
        task.record_stage(stage_output(Stage::Decompose, false));
        task.complete("done");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.result.as_deref(), Some("done"));
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn test_terminal_task_is_frozen() {
        let mut task = TaskRecord::new("task_2", "x");
        task.start();
        task.complete("first");
        task.complete("second");
        task.fail("late failure");
        task.record_stage(stage_output(Stage::Review, false));
        assert_eq!(task.result.as_deref(), Some("first"));
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.stages.is_empty());
    }

    #[test]
    fn test_failed_task_has_no_result() {
        let mut task = TaskRecord::new("task_3", "x");
        task.start();
        task.fail("backend down");
        assert!(task.result.is_none());
        assert_eq!(
            task.status,
            TaskStatus::Failed {
                reason: "backend down".to_string()
            }
        );
    }

    #[test]
    fn test_degraded_stage_count() {
        let mut task = TaskRecord::new("task_4", "x");
        task.record_stage(stage_output(Stage::Decompose, false));
        task.record_stage(stage_output(Stage::Research, true));
        task.record_stage(stage_output(Stage::Implement, true));
        assert_eq!(task.degraded_stages(), 2);
    }

    #[test]
    fn test_stage_roles() {
        let roles: Vec<AgentRole> = Stage::PIPELINE.iter().map(Stage::role).collect();
        assert_eq!(
            roles,
            vec![
                AgentRole::Coordinator,
                AgentRole::Researcher,
                AgentRole::Implementer,
                AgentRole::Critic,
                AgentRole::Coordinator,
            ]
        );
    }

    #[test]
    fn test_task_status_serialization() {
        let status = TaskStatus::Failed {
            reason: "timeout".to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("timeout"));
        let parsed: TaskStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);

        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
