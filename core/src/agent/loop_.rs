use crate::agent::ToolSet;
use crate::error::LoopError;
use crate::traits::{ChatMessage, ChatRequest, ChatResponse, Provider, ToolSpec};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Bounds on one loop instance: the iteration cap plus the timeout and retry
/// budgets applied at the model and tool execution boundaries.
#[derive(Debug, Clone)]
pub struct ExecutionPolicy {
    pub max_iterations: usize,
    pub model_timeout: Duration,
    pub model_attempts: u32,
    pub tool_timeout: Duration,
    pub tool_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model_timeout: Duration::from_secs(120),
            model_attempts: 2,
            tool_timeout: Duration::from_secs(30),
            tool_attempts: 3,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

impl ExecutionPolicy {
    /// Policy for a loop whose callables are other agents. A worker bounds
    /// its own external calls, and re-trying a failed worker is a routing
    /// decision for the model, not the executor: one attempt, long ceiling.
    pub fn delegation() -> Self {
        Self {
            tool_timeout: Duration::from_secs(600),
            tool_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }
}

/// How the calls of one acting step are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Concurrent,
    Sequential,
}

/// A finished loop: the final answer and the number of acting iterations
/// (tool-dispatch rounds) consumed.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub answer: String,
    pub iterations: usize,
}

/// The bounded reason→act→observe loop shared by workers and the supervisor.
/// Each `run` owns its transcript; the loop itself is stateless between runs,
/// so concurrent runs over the same instance never interfere. No detached
/// tasks are spawned: dropping the returned future aborts in-flight calls.
pub struct ReactLoop {
    name: String,
    provider: Arc<dyn Provider>,
    tools: ToolSet,
    system_prompt: String,
    policy: ExecutionPolicy,
    dispatch: Dispatch,
}

impl ReactLoop {
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn Provider>,
        tools: ToolSet,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            tools,
            system_prompt: system_prompt.into(),
            policy: ExecutionPolicy::default(),
            dispatch: Dispatch::Concurrent,
        }
    }

    pub fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn policy(&self) -> &ExecutionPolicy {
        &self.policy
    }

    pub async fn run(&self, task: &str) -> Result<LoopOutcome, LoopError> {
        let specs = self.tools.specs();
        let mut messages = vec![
            ChatMessage::system(&self.system_prompt),
            ChatMessage::user(task),
        ];
        let mut rounds = 0;

        // The budget is checked before any model traffic: a cap of 0 fails
        // without a single external call.
        for _ in 0..self.policy.max_iterations {
            let response = self.reason(&messages, &specs).await?;

            if !response.has_tool_calls() {
                let answer = response.text_or_empty().to_string();
                debug!(agent = %self.name, iterations = rounds, "loop finished");
                return Ok(LoopOutcome {
                    answer,
                    iterations: rounds,
                });
            }

            let calls = response.tool_calls;
            messages.push(ChatMessage::assistant_with_tool_calls(
                response.text.unwrap_or_default(),
                calls.clone(),
            ));

            let results = self
                .tools
                .dispatch_all(&calls, self.dispatch, &self.policy)
                .await;
            for (call, result) in calls.iter().zip(results) {
                let observation = serde_json::to_string(&result).unwrap_or_default();
                messages.push(ChatMessage::tool_result(call.id.clone(), observation));
            }
            rounds += 1;
        }

        Err(LoopError::IterationLimitExceeded {
            limit: self.policy.max_iterations,
        })
    }

    async fn reason(
        &self,
        messages: &[ChatMessage],
        specs: &[ToolSpec],
    ) -> Result<ChatResponse, LoopError> {
        let request = ChatRequest {
            messages,
            tools: if specs.is_empty() { None } else { Some(specs) },
        };

        let attempts = self.policy.model_attempts.max(1);
        let mut backoff = self.policy.retry_backoff;
        let mut reason = String::new();

        for attempt in 1..=attempts {
            match timeout(self.policy.model_timeout, self.provider.chat(request)).await {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => reason = e.to_string(),
                Err(_) => reason = format!("timed out after {:?}", self.policy.model_timeout),
            }

            if attempt < attempts {
                warn!(agent = %self.name, attempt, %reason, "model invocation failed, retrying");
                sleep(backoff).await;
                backoff *= 2;
            }
        }

        Err(LoopError::ModelInvocation { reason })
    }
}
