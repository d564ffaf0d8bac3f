use crate::agent::loop_::{ExecutionPolicy, ReactLoop};
use crate::agent::toolset::ToolSet;
use crate::config::AgentConfig;
use crate::error::LoopError;
use crate::traits::{Provider, SideEffect, Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// One specialized agent: a bounded ReAct loop over its resolved tool set.
/// The public contract to a caller is strictly sub-task in, final answer (or
/// typed error) out; the internal transcript is never exposed.
pub struct WorkerAgent {
    config: AgentConfig,
    loop_: ReactLoop,
}

impl WorkerAgent {
    pub fn new(
        config: AgentConfig,
        provider: Arc<dyn Provider>,
        tools: ToolSet,
        policy: ExecutionPolicy,
    ) -> Self {
        let loop_ = ReactLoop::new(
            config.name.clone(),
            provider,
            tools,
            config.system_prompt.clone(),
        )
        .with_policy(policy);

        Self { config, loop_ }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn description(&self) -> &str {
        &self.config.description
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.loop_.tools().names()
    }

    pub async fn invoke(&self, sub_task: &str) -> Result<String, LoopError> {
        debug!(worker = %self.config.name, "invoking worker");
        let outcome = self.loop_.run(sub_task).await?;
        Ok(outcome.answer)
    }

    /// Expose this worker as a callable under the uniform invocation
    /// contract, for use in a supervisor's callable set.
    pub fn callable(self: &Arc<Self>) -> Arc<dyn Tool> {
        Arc::new(WorkerCallable {
            agent: Arc::clone(self),
        })
    }
}

/// Adapter wrapping a worker as a `Tool` with a single required `task`
/// parameter. A worker failure becomes an error observation, so the calling
/// loop can route around it instead of crashing.
struct WorkerCallable {
    agent: Arc<WorkerAgent>,
}

#[async_trait]
impl Tool for WorkerCallable {
    fn name(&self) -> &str {
        self.agent.name()
    }

    fn description(&self) -> &str {
        self.agent.description()
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "task": {
                    "type": "string",
                    "description": "The sub-task for this agent"
                }
            },
            "required": ["task"]
        })
    }

    fn side_effect(&self) -> SideEffect {
        SideEffect::NetworkIo
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let Some(task) = args.get("task").and_then(|v| v.as_str()) else {
            return Ok(ToolResult::error("missing 'task' argument"));
        };

        match self.agent.invoke(task).await {
            Ok(answer) => Ok(ToolResult::success(answer)),
            Err(e) => Ok(ToolResult::error(format!(
                "worker '{}' failed: {}",
                self.agent.name(),
                e
            ))),
        }
    }
}
