use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub mod defaults;
pub mod resolver;

pub use defaults::{default_assembly, default_worker};
pub use resolver::{resolve_agent, resolve_assembly};

/// The enumerated model allow-list. A model id anywhere else in the
/// configuration must match one of these exactly.
pub const MODEL_ALLOW_LIST: &[&str] = &[
    "anthropic/claude-sonnet-4-20250514",
    "anthropic/claude-3-5-sonnet-latest",
    "openai/gpt-4.1",
    "openai/gpt-4.1-mini",
];

pub fn validate_model(model: &str) -> Result<(), ConfigError> {
    if MODEL_ALLOW_LIST.contains(&model) {
        Ok(())
    } else {
        Err(ConfigError::InvalidModel(model.to_string()))
    }
}

/// Validated configuration for one worker agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    /// Routing description shown to the supervisor's model.
    pub description: String,
    pub system_prompt: String,
    pub model: String,
    pub selected_tools: Vec<String>,
}

/// Validated configuration for the supervisor agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisorConfig {
    pub name: String,
    pub system_prompt: String,
    pub model: String,
}

/// The full validated assembly input: one supervisor plus its worker roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyConfig {
    pub supervisor: SupervisorConfig,
    pub workers: Vec<AgentConfig>,
}

/// Caller-supplied partial overrides for one agent. Keys outside this schema
/// land in `unknown` and are warned about, never silently renamed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentOverrides {
    pub name: Option<String>,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub selected_tools: Option<Vec<String>>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

/// Caller-supplied partial overrides for a whole assembly. Worker sections are
/// keyed by worker name; a key that names no default worker defines a new one
/// resolved against the generic worker defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssemblyOverrides {
    pub supervisor_system_prompt: Option<String>,
    pub supervisor_model: Option<String>,
    pub agents: BTreeMap<String, AgentOverrides>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

impl AssemblyOverrides {
    pub fn is_empty(&self) -> bool {
        self.supervisor_system_prompt.is_none()
            && self.supervisor_model.is_none()
            && self.agents.is_empty()
            && self.unknown.is_empty()
    }
}

/// Load assembly overrides from a TOML file.
pub fn load_overrides(path: impl AsRef<Path>) -> Result<AssemblyOverrides> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read overrides from {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("failed to parse overrides from {}", path.display()))
}
