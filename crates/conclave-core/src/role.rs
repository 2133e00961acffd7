use serde::{Deserialize, Serialize};

/// Role of each agent in the pipeline.
///
/// The set is closed: every orchestrator owns exactly one agent per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Breaks tasks down and synthesizes the final answer.
    Coordinator,
    /// Gathers background for the task.
    Researcher,
    /// Reviews the proposed solution.
    Critic,
    /// Produces the solution.
    Implementer,
}

impl AgentRole {
    /// All roles, in declaration order.
    pub const ALL: [AgentRole; 4] = [
        AgentRole::Coordinator,
        AgentRole::Researcher,
        AgentRole::Critic,
        AgentRole::Implementer,
    ];
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::Coordinator => write!(f, "coordinator"),
            AgentRole::Researcher => write!(f, "researcher"),
            AgentRole::Critic => write!(f, "critic"),
            AgentRole::Implementer => write!(f, "implementer"),
        }
    }
}
