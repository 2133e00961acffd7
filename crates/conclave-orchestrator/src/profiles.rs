use crate::types::AgentProfile;
use conclave_agent::ModelConfig;
use conclave_core::AgentRole;

/// Create the four agent profiles, all sharing `base_config`.
pub fn default_profiles(base_config: &ModelConfig) -> Vec<AgentProfile> {
    AgentRole::ALL
        .iter()
        .map(|role| AgentProfile {
            role: *role,
            model: base_config.clone(),
            system_prompt: system_prompt(*role).to_string(),
        })
        .collect()
}

/// The fixed system prompt bound to `role`.
pub fn system_prompt(role: AgentRole) -> &'static str {
    match role {
        AgentRole::Coordinator => COORDINATOR_PROMPT,
        AgentRole::Researcher => RESEARCHER_PROMPT,
        AgentRole::Critic => CRITIC_PROMPT,
        AgentRole::Implementer => IMPLEMENTER_PROMPT,
    }
}

const COORDINATOR_PROMPT: &str = "You are the coordinator agent. Your role is to break down \
tasks, assign them to appropriate agents, and ensure completion.";

const RESEARCHER_PROMPT: &str = "You are the researcher agent. Your role is to search latest \
research related to the tasks.";

const CRITIC_PROMPT: &str = "You are the critic agent. Your role is to review and provide \
constructive feedback on solutions.";

const IMPLEMENTER_PROMPT: &str = "You are the implementer agent. Your role is to execute tasks \
and implement solutions.";
