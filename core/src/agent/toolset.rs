use crate::agent::loop_::{Dispatch, ExecutionPolicy};
use crate::traits::{Tool, ToolCall, ToolResult, ToolSpec};
use futures_util::future::join_all;
use serde_json::json;
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tracing::warn;

/// The resolved tool set of one agent, plus the execution boundary every call
/// crosses: per-call timeout, bounded retry with doubling backoff, and
/// unknown-tool or bad-argument calls folded into error observations.
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    pub fn empty() -> Self {
        Self { tools: vec![] }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch every call of one acting step. Concurrent dispatch runs the
    /// calls simultaneously but results always come back in request order,
    /// keeping the transcript deterministic for the next reasoning step.
    pub async fn dispatch_all(
        &self,
        calls: &[ToolCall],
        dispatch: Dispatch,
        policy: &ExecutionPolicy,
    ) -> Vec<ToolResult> {
        match dispatch {
            Dispatch::Concurrent => {
                join_all(calls.iter().map(|call| self.dispatch(call, policy))).await
            }
            Dispatch::Sequential => {
                let mut results = Vec::with_capacity(calls.len());
                for call in calls {
                    results.push(self.dispatch(call, policy).await);
                }
                results
            }
        }
    }

    /// Dispatch a single call. Never returns an `Err`: every failure mode
    /// becomes a `ToolResult::error` observation the model can react to.
    pub async fn dispatch(&self, call: &ToolCall, policy: &ExecutionPolicy) -> ToolResult {
        let Some(tool) = self.get(&call.name) else {
            return ToolResult::error(format!(
                "tool '{}' is not available to this agent",
                call.name
            ));
        };

        let args: serde_json::Value = if call.arguments.trim().is_empty() {
            json!({})
        } else {
            match serde_json::from_str(&call.arguments) {
                Ok(value) => value,
                Err(e) => {
                    return ToolResult::error(format!(
                        "invalid arguments for tool '{}': {}",
                        call.name, e
                    ));
                }
            }
        };

        let attempts = policy.tool_attempts.max(1);
        let mut backoff = policy.retry_backoff;
        let mut last_failure = String::new();

        for attempt in 1..=attempts {
            match timeout(policy.tool_timeout, tool.execute(args.clone())).await {
                // A result the tool itself produced is final, success or not;
                // only transport failures and timeouts are retried.
                Ok(Ok(result)) => return result,
                Ok(Err(e)) => last_failure = e.to_string(),
                Err(_) => {
                    last_failure = format!("timed out after {:?}", policy.tool_timeout);
                }
            }

            if attempt < attempts {
                warn!(
                    tool = %call.name,
                    attempt,
                    failure = %last_failure,
                    "tool call failed, retrying"
                );
                sleep(backoff).await;
                backoff *= 2;
            }
        }

        ToolResult::error(format!(
            "tool '{}' failed after {} attempts: {}",
            call.name, attempts, last_failure
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DelayedTool, FailingTool, FixedTool, SlowThenFastTool, tool_call};
    use std::time::Duration;

    fn policy() -> ExecutionPolicy {
        ExecutionPolicy {
            tool_timeout: Duration::from_millis(50),
            tool_attempts: 3,
            retry_backoff: Duration::from_millis(10),
            ..ExecutionPolicy::default()
        }
    }

    #[tokio::test]
    async fn unknown_tool_becomes_an_error_observation() {
        let set = ToolSet::new(vec![FixedTool::new("alpha", "a")]);
        let result = set.dispatch(&tool_call("missing", json!({})), &policy()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("not available"));
    }

    #[tokio::test]
    async fn malformed_arguments_become_an_error_observation() {
        let set = ToolSet::new(vec![FixedTool::new("alpha", "a")]);
        let mut call = tool_call("alpha", json!({}));
        call.arguments = "{not json".to_string();
        let result = set.dispatch(&call, &policy()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("invalid arguments"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeouts_are_retried_within_budget() {
        let tool = SlowThenFastTool::new("flaky", 2, Duration::from_secs(3600), "made it");
        let set = ToolSet::new(vec![tool.clone()]);

        let result = set.dispatch(&tool_call("flaky", json!({})), &policy()).await;
        assert!(result.success);
        assert_eq!(result.output, "made it");
        assert_eq!(tool.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_surface_as_failed_observation() {
        let tool = SlowThenFastTool::new("stuck", 10, Duration::from_secs(3600), "never");
        let set = ToolSet::new(vec![tool.clone()]);

        let result = set.dispatch(&tool_call("stuck", json!({})), &policy()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("after 3 attempts"));
        assert_eq!(tool.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_are_retried_then_surfaced() {
        let tool = FailingTool::new("down");
        let set = ToolSet::new(vec![tool.clone()]);

        let result = set.dispatch(&tool_call("down", json!({})), &policy()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("upstream unavailable"));
        assert_eq!(tool.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_dispatch_keeps_request_order() {
        let set = ToolSet::new(vec![
            DelayedTool::new("slow", Duration::from_millis(30), "first requested"),
            DelayedTool::new("fast", Duration::from_millis(1), "second requested"),
        ]);

        let calls = vec![tool_call("slow", json!({})), tool_call("fast", json!({}))];
        let results = set
            .dispatch_all(&calls, Dispatch::Concurrent, &policy())
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].output, "first requested");
        assert_eq!(results[1].output, "second requested");
    }
}
