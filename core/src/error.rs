use thiserror::Error;

/// Configuration failures detected while resolving defaults and overrides.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid model id '{0}', expected one of the allow-listed models")]
    InvalidModel(String),

    #[error("malformed override: {0}")]
    MalformedOverride(String),
}

/// Failures raised while assembling agents from configuration. All of these
/// are fatal before any agent runs.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("duplicate agent name '{0}'")]
    DuplicateAgent(String),

    #[error("agent '{0}' cannot appear in its own callable set")]
    SelfReference(String),

    #[error("no agent named '{0}' in the configuration")]
    UnknownAgent(String),

    #[error("failed to construct model client for '{model}': {reason}")]
    Provider { model: String, reason: String },
}

/// Terminal failure of one reason/act/observe loop instance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoopError {
    #[error("iteration limit of {limit} exceeded")]
    IterationLimitExceeded { limit: usize },

    #[error("model invocation failed: {reason}")]
    ModelInvocation { reason: String },
}

/// The one structured error a top-level caller can receive. Identifies the
/// failing stage: assembly, a named worker, or the supervisor.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("worker '{agent}' failed: {source}")]
    Worker {
        agent: String,
        #[source]
        source: LoopError,
    },

    #[error("supervisor failed: {0}")]
    Supervisor(LoopError),
}
