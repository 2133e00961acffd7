use conclave_agent::ModelConfig;
use conclave_core::{ConclaveError, ConclaveResult};
use conclave_orchestrator::PipelineConfig;
use serde::Deserialize;
use std::path::Path;

/// Contents of `conclave.toml`. Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ConclaveConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl ConclaveConfig {
    /// Load from `path`, or fall back to defaults when `path` does not exist
    /// and `required` is false.
    pub async fn load(path: &Path, required: bool) -> ConclaveResult<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                Ok(Self::default())
            }
            Err(e) => Err(ConclaveError::Config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))),
        }
    }

    pub fn from_toml(text: &str) -> ConclaveResult<Self> {
        toml::from_str(text).map_err(|e| ConclaveError::Config(e.to_string()))
    }

    /// Fill in the API key from the provider's environment variable when the
    /// file leaves it empty.
    pub fn resolve_api_key(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConclaveResult<()> {
        if !self.model.api_key.is_empty() {
            return Ok(());
        }
        let var = self.model.provider.api_key_env();
        match lookup(var).filter(|key| !key.trim().is_empty()) {
            Some(key) => {
                self.model.api_key = key;
                Ok(())
            }
            None => Err(ConclaveError::Config(format!(
                "No API key configured: set model.api_key or {var}"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use conclave_agent::LlmProvider;
    use conclave_orchestrator::{ContextMode, FailureMode};

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ConclaveConfig::from_toml("").unwrap();
        assert_eq!(config.model.provider, LlmProvider::Claude);
        assert_eq!(config.model.max_tokens, 1024);
        assert_eq!(config.pipeline.context_mode, ContextMode::Shared);
        assert_eq!(config.pipeline.failure_mode, FailureMode::Degraded);
    }

    #[test]
    fn test_full_file() {
        let config = ConclaveConfig::from_toml(
            r#"
            [model]
            provider = "openrouter"
            model_id = "anthropic/claude-sonnet-4"
            max_tokens = 2048

            [pipeline]
            context_mode = "isolated"
            failure_mode = "strict"
            history_window = 8
            stage_timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.model.provider, LlmProvider::OpenRouter);
        assert_eq!(config.model.max_tokens, 2048);
        assert_eq!(config.pipeline.history_window, 8);
        assert_eq!(config.pipeline.stage_timeout_secs, 30);
        assert_eq!(config.pipeline.failure_mode, FailureMode::Strict);
    }

    #[test]
    fn test_partial_model_table() {
        let config = ConclaveConfig::from_toml("[model]\nmax_tokens = 2048\n").unwrap();
        assert_eq!(config.model.provider, LlmProvider::Claude);
        assert_eq!(config.model.model_id, "claude-3-sonnet-20240229");
        assert_eq!(config.model.max_tokens, 2048);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let err = ConclaveConfig::from_toml("[pipeline]\nfailure_mode = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConclaveError::Config(_)));
    }

    #[test]
    fn test_api_key_from_environment() {
        let mut config = ConclaveConfig::default();
        config
            .resolve_api_key(|var| (var == "ANTHROPIC_API_KEY").then(|| "sk-env".to_string()))
            .unwrap();
        assert_eq!(config.model.api_key, "sk-env");
    }

    #[test]
    fn test_api_key_in_file_wins() {
        let mut config = ConclaveConfig::default();
        config.model.api_key = "sk-file".to_string();
        config
            .resolve_api_key(|_| Some("sk-env".to_string()))
            .unwrap();
        assert_eq!(config.model.api_key, "sk-file");
    }

    #[test]
    fn test_missing_api_key() {
        let mut config = ConclaveConfig::default();
        config.model.provider = LlmProvider::Groq;
        let err = config.resolve_api_key(|_| None).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[tokio::test]
    async fn test_load_missing_optional_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ConclaveConfig::load(&tmp.path().join("conclave.toml"), false)
            .await
            .unwrap();
        assert_eq!(config.pipeline.history_window, 5);
    }

    #[tokio::test]
    async fn test_load_missing_required_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ConclaveConfig::load(&tmp.path().join("nope.toml"), true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("conclave.toml");
        std::fs::write(&path, "[pipeline]\ncontext_mode = \"isolated\"\n").unwrap();
        let config = ConclaveConfig::load(&path, true).await.unwrap();
        assert_eq!(config.pipeline.context_mode, ContextMode::Isolated);
    }
}
