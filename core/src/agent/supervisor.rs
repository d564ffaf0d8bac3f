use crate::agent::loop_::{Dispatch, ExecutionPolicy, LoopOutcome, ReactLoop};
use crate::agent::toolset::ToolSet;
use crate::agent::worker::WorkerAgent;
use crate::config::SupervisorConfig;
use crate::error::LoopError;
use crate::traits::Provider;
use std::sync::Arc;
use tracing::info;

/// The delegation loop: structurally the same state machine as a worker, but
/// its callables are the workers themselves. Dispatch is sequential because a
/// routing decision depends on the previous worker's result. The callable set
/// is fixed at construction from already-built workers, so the supervisor can
/// never route to itself.
pub struct SupervisorAgent {
    config: SupervisorConfig,
    workers: Vec<Arc<WorkerAgent>>,
    loop_: ReactLoop,
}

impl std::fmt::Debug for SupervisorAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupervisorAgent")
            .field("name", &self.config.name)
            .field("workers", &self.workers.len())
            .finish()
    }
}

impl SupervisorAgent {
    pub fn new(
        config: SupervisorConfig,
        provider: Arc<dyn Provider>,
        workers: Vec<Arc<WorkerAgent>>,
        policy: ExecutionPolicy,
    ) -> Self {
        let callables = workers.iter().map(WorkerAgent::callable).collect();
        let loop_ = ReactLoop::new(
            config.name.clone(),
            provider,
            ToolSet::new(callables),
            config.system_prompt.clone(),
        )
        .with_policy(policy)
        .with_dispatch(Dispatch::Sequential);

        Self {
            config,
            workers,
            loop_,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn workers(&self) -> &[Arc<WorkerAgent>] {
        &self.workers
    }

    pub fn worker(&self, name: &str) -> Option<&Arc<WorkerAgent>> {
        self.workers.iter().find(|w| w.name() == name)
    }

    pub async fn run(&self, task: &str) -> Result<LoopOutcome, LoopError> {
        info!(supervisor = %self.config.name, workers = self.workers.len(), "starting run");
        self.loop_.run(task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::testing::{ScriptedProvider, call, error, text};
    use serde_json::json;

    fn worker(name: &str, description: &str, provider: Arc<ScriptedProvider>) -> Arc<WorkerAgent> {
        Arc::new(WorkerAgent::new(
            AgentConfig {
                name: name.to_string(),
                description: description.to_string(),
                system_prompt: format!("you are {name}"),
                model: "openai/gpt-4.1".to_string(),
                selected_tools: vec![],
            },
            provider,
            ToolSet::empty(),
            ExecutionPolicy::default(),
        ))
    }

    fn supervisor_config() -> SupervisorConfig {
        SupervisorConfig {
            name: "supervisor".to_string(),
            system_prompt: "route sub-tasks to your team".to_string(),
            model: "openai/gpt-4.1".to_string(),
        }
    }

    #[tokio::test]
    async fn routes_through_two_workers_then_completes() {
        let finance = worker(
            "finance_research_agent",
            "finance research",
            ScriptedProvider::new(vec![text("AAPL up 2%")]),
        );
        let writing = worker(
            "writing_agent",
            "content writing",
            ScriptedProvider::new(vec![text("Post: AAPL up 2%")]),
        );
        let provider = ScriptedProvider::new(vec![
            call("finance_research_agent", json!({"task": "research AAPL"})),
            call("writing_agent", json!({"task": "write a post: AAPL up 2%"})),
            text("Post: AAPL up 2%"),
        ]);

        let supervisor = SupervisorAgent::new(
            supervisor_config(),
            provider.clone(),
            vec![finance, writing],
            ExecutionPolicy::delegation(),
        );

        let outcome = supervisor.run("write a post about AAPL").await.unwrap();
        assert_eq!(outcome.answer, "Post: AAPL up 2%");
        assert_eq!(outcome.iterations, 2);

        // The supervisor saw only final answers, never worker transcripts.
        let transcript = provider.request(2);
        let observations: Vec<_> = transcript.iter().filter(|m| m.role == "tool").collect();
        assert_eq!(observations.len(), 2);
        assert!(observations[0].content.contains("AAPL up 2%"));
        assert!(!observations[0].content.contains("you are"));
    }

    #[tokio::test(start_paused = true)]
    async fn routes_around_a_failing_worker() {
        let broken = worker(
            "finance_research_agent",
            "finance research",
            ScriptedProvider::new(vec![error("model down"), error("model down")]),
        );
        let backup = worker(
            "general_research_agent",
            "general research",
            ScriptedProvider::new(vec![text("AAPL gained 2% today")]),
        );
        let provider = ScriptedProvider::new(vec![
            call("finance_research_agent", json!({"task": "research AAPL"})),
            call("general_research_agent", json!({"task": "research AAPL"})),
            text("AAPL gained 2% today"),
        ]);

        let supervisor = SupervisorAgent::new(
            supervisor_config(),
            provider.clone(),
            vec![broken, backup],
            ExecutionPolicy::delegation(),
        );

        let outcome = supervisor.run("what did AAPL do").await.unwrap();
        assert_eq!(outcome.answer, "AAPL gained 2% today");

        // The failure reached the supervisor as an observation, not a crash.
        let transcript = provider.request(1);
        let observation = transcript.last().unwrap();
        assert_eq!(observation.role, "tool");
        assert!(observation.content.contains("finance_research_agent"));
        assert!(observation.content.contains("failed"));
    }

    #[tokio::test]
    async fn routing_cycles_are_bounded_by_the_iteration_cap() {
        let echo = worker(
            "general_research_agent",
            "general research",
            ScriptedProvider::new(vec![text("nothing new"), text("nothing new")]),
        );
        let provider = ScriptedProvider::new(vec![
            call("general_research_agent", json!({"task": "look again"})),
            call("general_research_agent", json!({"task": "look again"})),
            call("general_research_agent", json!({"task": "look again"})),
        ]);

        let supervisor = SupervisorAgent::new(
            supervisor_config(),
            provider,
            vec![echo],
            ExecutionPolicy::delegation().with_max_iterations(2),
        );

        let err = supervisor.run("keep looking").await.unwrap_err();
        assert_eq!(err, LoopError::IterationLimitExceeded { limit: 2 });
    }
}
