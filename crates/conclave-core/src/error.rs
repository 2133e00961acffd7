use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A convenience `Result` alias using [`ConclaveError`].
pub type ConclaveResult<T> = Result<T, ConclaveError>;

/// Category of an inference backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendErrorKind {
    /// The request never produced an HTTP response (DNS, connect, reset).
    Transport,
    /// The provider rejected the credentials.
    Auth,
    /// The provider throttled the request.
    RateLimit,
    /// The stage deadline elapsed before the backend answered.
    Timeout,
    /// The provider answered with an error or refused to generate.
    Model,
    /// The response could not be interpreted as generated text.
    Malformed,
}

impl BackendErrorKind {
    /// Classify a non-success HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            429 => Self::RateLimit,
            408 | 504 => Self::Timeout,
            _ => Self::Model,
        }
    }
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Auth => write!(f, "auth"),
            Self::RateLimit => write!(f, "rate limit"),
            Self::Timeout => write!(f, "timeout"),
            Self::Model => write!(f, "model"),
            Self::Malformed => write!(f, "malformed response"),
        }
    }
}

/// Top-level error type for Conclave.
#[derive(Error, Debug)]
pub enum ConclaveError {
    /// The inference backend failed to produce text.
    #[error("Backend {kind} error: {detail}")]
    Backend {
        /// What went wrong.
        kind: BackendErrorKind,
        /// Provider or transport detail.
        detail: String,
    },

    /// A pipeline stage failed and the task was halted.
    #[error("Task {task_id} failed at stage '{stage}': {source}")]
    Stage {
        /// Id of the failed task.
        task_id: String,
        /// Name of the stage that failed.
        stage: String,
        /// The underlying failure.
        #[source]
        source: Box<ConclaveError>,
    },

    /// Configuration is missing or invalid.
    #[error("Config error: {0}")]
    Config(String),

    /// The orchestrator reached an inconsistent state.
    #[error("Orchestrator error: {0}")]
    Orchestrator(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConclaveError {
    /// Shorthand for a [`ConclaveError::Backend`] error.
    pub fn backend(kind: BackendErrorKind, detail: impl Into<String>) -> Self {
        Self::Backend {
            kind,
            detail: detail.into(),
        }
    }

    /// The backend failure category, looking through stage wrappers.
    pub fn backend_kind(&self) -> Option<BackendErrorKind> {
        match self {
            Self::Backend { kind, .. } => Some(*kind),
            Self::Stage { source, .. } => source.backend_kind(),
            _ => None,
        }
    }
}
