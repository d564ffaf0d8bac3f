//! Pure resolution of defaults plus caller overrides into validated
//! configuration. Same inputs always produce the same output, so assembly can
//! re-run the resolver on every request.

use super::{AgentConfig, AgentOverrides, AssemblyConfig, AssemblyOverrides, validate_model};
use crate::config::defaults::default_worker;
use crate::error::ConfigError;
use std::collections::BTreeMap;
use tracing::warn;

fn warn_unknown_keys(scope: &str, unknown: &BTreeMap<String, toml::Value>) {
    for key in unknown.keys() {
        warn!(scope, key = %key, "ignoring unrecognized configuration key");
    }
}

/// Merge one worker's overrides into its defaults, key by key, and validate
/// the result.
pub fn resolve_agent(
    defaults: &AgentConfig,
    overrides: &AgentOverrides,
) -> Result<AgentConfig, ConfigError> {
    warn_unknown_keys(&defaults.name, &overrides.unknown);

    let resolved = AgentConfig {
        name: overrides.name.clone().unwrap_or_else(|| defaults.name.clone()),
        description: overrides
            .description
            .clone()
            .unwrap_or_else(|| defaults.description.clone()),
        system_prompt: overrides
            .system_prompt
            .clone()
            .unwrap_or_else(|| defaults.system_prompt.clone()),
        model: overrides.model.clone().unwrap_or_else(|| defaults.model.clone()),
        selected_tools: overrides
            .selected_tools
            .clone()
            .unwrap_or_else(|| defaults.selected_tools.clone()),
    };

    if resolved.name.trim().is_empty() {
        return Err(ConfigError::MalformedOverride(
            "agent name must not be empty".to_string(),
        ));
    }
    validate_model(&resolved.model)?;

    Ok(resolved)
}

/// Resolve a whole assembly: the supervisor, every default worker, and any
/// override section that defines a new worker on top of the generic defaults.
pub fn resolve_assembly(
    defaults: &AssemblyConfig,
    overrides: &AssemblyOverrides,
) -> Result<AssemblyConfig, ConfigError> {
    warn_unknown_keys("assembly", &overrides.unknown);

    let mut supervisor = defaults.supervisor.clone();
    if let Some(prompt) = &overrides.supervisor_system_prompt {
        supervisor.system_prompt = prompt.clone();
    }
    if let Some(model) = &overrides.supervisor_model {
        supervisor.model = model.clone();
    }
    validate_model(&supervisor.model)?;

    let empty = AgentOverrides::default();
    let mut workers = Vec::with_capacity(defaults.workers.len());
    for worker in &defaults.workers {
        let agent_overrides = overrides.agents.get(&worker.name).unwrap_or(&empty);
        workers.push(resolve_agent(worker, agent_overrides)?);
    }

    // Override sections naming no default worker define new workers.
    for (name, agent_overrides) in &overrides.agents {
        if defaults.workers.iter().any(|w| &w.name == name) {
            continue;
        }
        workers.push(resolve_agent(&default_worker(name), agent_overrides)?);
    }

    Ok(AssemblyConfig { supervisor, workers })
}
