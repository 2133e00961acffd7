use crate::config::{ContextMode, FailureMode, PipelineConfig};
use crate::monitor::AgentMonitor;
use crate::profiles::default_profiles;
use crate::types::{AgentProfile, Stage, StageOutput, TaskRecord};
use conclave_agent::backends::LlmBackend;
use conclave_agent::{Agent, LlmClient, ModelConfig};
use conclave_core::{AgentRole, ConclaveError, ConclaveResult, Message};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

/// Builds the backend for a role, replacing the HTTP client chosen from the
/// role's [`ModelConfig`]. Used for custom providers and tests.
pub type BackendFactory = Arc<dyn Fn(AgentRole) -> Box<dyn LlmBackend> + Send + Sync>;

/// One agent per role.
struct AgentSet {
    agents: HashMap<AgentRole, Agent>,
}

impl AgentSet {
    fn get_mut(&mut self, role: AgentRole) -> ConclaveResult<&mut Agent> {
        self.agents.get_mut(&role).ok_or_else(|| {
            ConclaveError::Orchestrator(format!("No agent configured for role: {role}"))
        })
    }
}

/// The multi-agent pipeline engine.
///
/// Every submitted task runs through the five stages of [`Stage::PIPELINE`]
/// in order. In [`ContextMode::Shared`] the agents (and their histories)
/// live as long as the engine and submissions are serialized; in
/// [`ContextMode::Isolated`] each submission builds its own agents.
pub struct MultiAgentSystem {
    profiles: HashMap<AgentRole, AgentProfile>,
    config: PipelineConfig,
    backend_factory: Option<BackendFactory>,
    shared: Option<Mutex<AgentSet>>,
    tasks: Arc<RwLock<Vec<TaskRecord>>>,
    next_task: AtomicU64,
    monitor: Arc<AgentMonitor>,
}

impl MultiAgentSystem {
    /// Create an engine with the default profiles built from `base_config`.
    pub fn new(base_config: &ModelConfig, config: PipelineConfig) -> Self {
        let profiles = default_profiles(base_config)
            .into_iter()
            .map(|p| (p.role, p))
            .collect();
        Self::from_profiles(profiles, config)
    }

    /// Create with custom profiles.
    ///
    /// `profiles` must hold exactly one profile for each [`AgentRole`];
    /// anything else is a [`ConclaveError::Config`].
    pub fn with_profiles(
        profiles: Vec<AgentProfile>,
        config: PipelineConfig,
    ) -> ConclaveResult<Self> {
        let mut by_role = HashMap::with_capacity(AgentRole::ALL.len());
        for profile in profiles {
            let role = profile.role;
            if by_role.insert(role, profile).is_some() {
                return Err(ConclaveError::Config(format!(
                    "Duplicate profile for role: {role}"
                )));
            }
        }
        if let Some(missing) = AgentRole::ALL.iter().find(|r| !by_role.contains_key(*r)) {
            return Err(ConclaveError::Config(format!(
                "No profile configured for role: {missing}"
            )));
        }
        Ok(Self::from_profiles(by_role, config))
    }

    fn from_profiles(profiles: HashMap<AgentRole, AgentProfile>, config: PipelineConfig) -> Self {
        let mut system = Self {
            profiles,
            config,
            backend_factory: None,
            shared: None,
            tasks: Arc::new(RwLock::new(Vec::new())),
            next_task: AtomicU64::new(1),
            monitor: Arc::new(AgentMonitor::new()),
        };
        system.reset_shared_agents();
        system
    }

    /// Replace how backends are built. Shared agents are rebuilt with empty history.
    pub fn with_backend_factory(mut self, factory: BackendFactory) -> Self {
        self.backend_factory = Some(factory);
        self.reset_shared_agents();
        self
    }

    fn reset_shared_agents(&mut self) {
        self.shared = match self.config.context_mode {
            ContextMode::Shared => Some(Mutex::new(self.build_agents())),
            ContextMode::Isolated => None,
        };
    }

    fn build_agents(&self) -> AgentSet {
        let agents = self
            .profiles
            .values()
            .map(|profile| {
                let llm = match &self.backend_factory {
                    Some(factory) => LlmClient::from_backend(factory(profile.role)),
                    None => LlmClient::new(profile.model.clone()),
                };
                let mut agent = Agent::new(profile.role, profile.system_prompt.clone(), llm)
                    .with_window(self.config.history_window);
                if let Some(timeout) = self.config.stage_timeout() {
                    agent = agent.with_timeout(timeout);
                }
                (profile.role, agent)
            })
            .collect();
        AgentSet { agents }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn profile(&self, role: AgentRole) -> Option<&AgentProfile> {
        self.profiles.get(&role)
    }

    pub fn monitor(&self) -> &Arc<AgentMonitor> {
        &self.monitor
    }

    /// All submitted tasks, in submission order.
    pub async fn tasks(&self) -> Vec<TaskRecord> {
        self.tasks.read().await.clone()
    }

    pub async fn task(&self, task_id: &str) -> Option<TaskRecord> {
        self.tasks
            .read()
            .await
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
    }

    /// Full history of the shared agent for `role`.
    ///
    /// Returns `None` in isolated mode, where agents do not outlive a task.
    /// Waits for any running pipeline to finish.
    pub async fn agent_history(&self, role: AgentRole) -> Option<Vec<Message>> {
        let shared = self.shared.as_ref()?;
        let agents = shared.lock().await;
        agents
            .agents
            .get(&role)
            .map(|agent| agent.history().messages().to_vec())
    }

    /// Run a task through the full pipeline and return the synthesized result.
    ///
    /// In [`FailureMode::Strict`] the first failing stage marks the task
    /// failed and its error is returned as [`ConclaveError::Stage`].
    pub async fn submit(&self, description: &str) -> ConclaveResult<String> {
        let task_id = self.create_task(description).await;
        let mut guard = CancelGuard {
            tasks: Arc::clone(&self.tasks),
            task_id: task_id.clone(),
            armed: true,
        };
        let start = Instant::now();

        info!(
            task_id = %task_id,
            context_mode = ?self.config.context_mode,
            failure_mode = ?self.config.failure_mode,
            "Task submitted"
        );

        let outcome = match &self.shared {
            Some(shared) => {
                let mut agents = shared.lock().await;
                self.run_pipeline(&mut agents, &task_id, description).await
            }
            None => {
                let mut agents = self.build_agents();
                self.run_pipeline(&mut agents, &task_id, description).await
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(final_text) => {
                let degraded = self
                    .update_task(&task_id, |task| {
                        task.complete(final_text.clone());
                        task.degraded_stages()
                    })
                    .await
                    .unwrap_or(0);
                guard.armed = false;
                info!(task_id = %task_id, duration_ms, degraded_stages = degraded, "Task completed");
                Ok(final_text)
            }
            Err(e) => {
                self.update_task(&task_id, |task| task.fail(e.to_string()))
                    .await;
                guard.armed = false;
                error!(task_id = %task_id, duration_ms, error = %e, "Task failed");
                Err(e)
            }
        }
    }

    async fn create_task(&self, description: &str) -> String {
        let mut tasks = self.tasks.write().await;
        let task_id = format!("task_{}", self.next_task.fetch_add(1, Ordering::SeqCst));
        tasks.push(TaskRecord::new(task_id.clone(), description));
        task_id
    }

    async fn update_task<T>(
        &self,
        task_id: &str,
        f: impl FnOnce(&mut TaskRecord) -> T,
    ) -> Option<T> {
        let mut tasks = self.tasks.write().await;
        tasks.iter_mut().find(|t| t.id == task_id).map(f)
    }

    async fn run_pipeline(
        &self,
        agents: &mut AgentSet,
        task_id: &str,
        description: &str,
    ) -> ConclaveResult<String> {
        self.update_task(task_id, TaskRecord::start).await;

        let plan = self
            .run_stage(
                agents,
                task_id,
                Stage::Decompose,
                format!("Please break down this task into subtasks: {description}"),
            )
            .await?;

        let research = self
            .run_stage(
                agents,
                task_id,
                Stage::Research,
                format!("Please research the following task: {description}\n\nContext: {plan}"),
            )
            .await?;

        let implementation = self
            .run_stage(
                agents,
                task_id,
                Stage::Implement,
                format!(
                    "Please implement a solution for: {description}\n\n\
                     Research findings: {research}"
                ),
            )
            .await?;

        let critique = self
            .run_stage(
                agents,
                task_id,
                Stage::Review,
                format!(
                    "Please review this solution: {implementation}\n\n\
                     Original task: {description}"
                ),
            )
            .await?;

        self.run_stage(
            agents,
            task_id,
            Stage::Synthesize,
            format!(
                "Please synthesize a final response for the task: {description}\n\n\
                 Implementation: {implementation}\n\n\
                 Critic's review: {critique}"
            ),
        )
        .await
    }

    async fn run_stage(
        &self,
        agents: &mut AgentSet,
        task_id: &str,
        stage: Stage,
        prompt: String,
    ) -> ConclaveResult<String> {
        let role = stage.role();
        let agent = agents.get_mut(role)?;

        info!(task_id = %task_id, stage = %stage, role = %role, "Running stage");
        self.monitor.start_task(role, task_id).await;
        let start = Instant::now();

        let result = agent.exchange(&prompt).await;

        self.monitor
            .record_duration(role, start.elapsed().as_millis() as u64)
            .await;

        let (content, degraded) = match result {
            Ok(resp) => {
                self.monitor.record_call(role, resp.usage).await;
                self.monitor.finish_task(role).await;
                (resp.text, false)
            }
            Err(e) => {
                self.monitor.record_error(role).await;
                match self.config.failure_mode {
                    FailureMode::Strict => {
                        error!(task_id = %task_id, stage = %stage, error = %e, "Stage failed, halting pipeline");
                        return Err(ConclaveError::Stage {
                            task_id: task_id.to_string(),
                            stage: stage.to_string(),
                            source: Box::new(e),
                        });
                    }
                    FailureMode::Degraded => {
                        warn!(task_id = %task_id, stage = %stage, error = %e, "Stage failed, continuing with placeholder");
                        (agent.record_failure(&e), true)
                    }
                }
            }
        };

        self.update_task(task_id, |task| {
            task.record_stage(StageOutput {
                stage,
                role,
                prompt,
                content: content.clone(),
                degraded,
            });
        })
        .await;

        Ok(content)
    }
}

/// Fails the task if `submit` is dropped before writing a terminal status.
struct CancelGuard {
    tasks: Arc<RwLock<Vec<TaskRecord>>>,
    task_id: String,
    armed: bool,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(task_id = %self.task_id, "Task dropped before completion");
        if let Ok(mut tasks) = self.tasks.try_write() {
            cancel_task(&mut tasks, &self.task_id);
        } else if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let tasks = Arc::clone(&self.tasks);
            let task_id = std::mem::take(&mut self.task_id);
            handle.spawn(async move {
                cancel_task(&mut tasks.write().await, &task_id);
            });
        }
    }
}

fn cancel_task(tasks: &mut [TaskRecord], task_id: &str) {
    if let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) {
        task.fail("cancelled");
    }
}
