use crate::types::{AgentMetrics, AgentState, WorkerStatus};
use conclave_agent::TokenUsage;
use conclave_core::AgentRole;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Tracks state and metrics for all agents in the pipeline.
pub struct AgentMonitor {
    states: Arc<RwLock<HashMap<AgentRole, AgentState>>>,
}

impl AgentMonitor {
    pub fn new() -> Self {
        let states = AgentRole::ALL
            .iter()
            .map(|role| {
                (
                    *role,
                    AgentState {
                        role: *role,
                        current_task: None,
                        status: WorkerStatus::Idle,
                        metrics: AgentMetrics::default(),
                    },
                )
            })
            .collect();
        Self {
            states: Arc::new(RwLock::new(states)),
        }
    }

    /// Mark an agent as working on a task.
    pub async fn start_task(&self, role: AgentRole, task_id: &str) {
        let mut states = self.states.write().await;
        if let Some(state) = states.get_mut(&role) {
            state.current_task = Some(task_id.to_string());
            state.status = WorkerStatus::Working;
        }
    }

    /// Mark an agent as idle after a successful call.
    pub async fn finish_task(&self, role: AgentRole) {
        let mut states = self.states.write().await;
        if let Some(state) = states.get_mut(&role) {
            state.current_task = None;
            state.status = WorkerStatus::Idle;
        }
    }

    /// Record a failed call; the agent stays in the error state until its next call.
    pub async fn record_error(&self, role: AgentRole) {
        let mut states = self.states.write().await;
        if let Some(state) = states.get_mut(&role) {
            state.metrics.calls += 1;
            state.metrics.errors += 1;
            state.current_task = None;
            state.status = WorkerStatus::Error;
        }
    }

    /// Record a successful call and its token usage.
    pub async fn record_call(&self, role: AgentRole, usage: TokenUsage) {
        let mut states = self.states.write().await;
        if let Some(state) = states.get_mut(&role) {
            state.metrics.calls += 1;
            state.metrics.input_tokens += usage.input_tokens;
            state.metrics.output_tokens += usage.output_tokens;
        }
    }

    /// Record execution duration for an agent.
    pub async fn record_duration(&self, role: AgentRole, duration_ms: u64) {
        let mut states = self.states.write().await;
        if let Some(state) = states.get_mut(&role) {
            state.metrics.duration_ms += duration_ms;
        }
    }

    /// Snapshot of all agent states, ordered by role.
    pub async fn snapshot(&self) -> Vec<AgentState> {
        let states = self.states.read().await;
        let mut snapshot: Vec<AgentState> = states.values().cloned().collect();
        snapshot.sort_by_key(|s| s.role);
        snapshot
    }

    pub async fn get_state(&self, role: AgentRole) -> Option<AgentState> {
        let states = self.states.read().await;
        states.get(&role).cloned()
    }

    /// Get aggregate metrics across all agents.
    pub async fn aggregate_metrics(&self) -> AgentMetrics {
        let states = self.states.read().await;
        let mut total = AgentMetrics::default();
        for state in states.values() {
            total.calls += state.metrics.calls;
            total.errors += state.metrics.errors;
            total.duration_ms += state.metrics.duration_ms;
            total.input_tokens += state.metrics.input_tokens;
            total.output_tokens += state.metrics.output_tokens;
        }
        total
    }

    pub async fn to_json(&self) -> serde_json::Value {
        let states = self.snapshot().await;
        let aggregate = self.aggregate_metrics().await;
        serde_json::json!({
            "agents": states,
            "aggregate": aggregate,
        })
    }
}

impl Default for AgentMonitor {
    fn default() -> Self {
        Self::new()
    }
}
