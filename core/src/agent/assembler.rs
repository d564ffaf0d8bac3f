use crate::agent::loop_::ExecutionPolicy;
use crate::agent::registry::ToolRegistry;
use crate::agent::supervisor::SupervisorAgent;
use crate::agent::toolset::ToolSet;
use crate::agent::worker::WorkerAgent;
use crate::config::{
    AgentConfig, AssemblyConfig, AssemblyOverrides, default_assembly, resolve_assembly,
};
use crate::error::{AssemblyError, RunError};
use crate::providers::ProviderFactory;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Turns validated configuration into running agent instances: workers first,
/// then the supervisor from the already-built workers. Assembly is idempotent
/// and side-effect-free beyond allocation, so it can run once per request to
/// pick up configuration changes without a process restart.
pub struct GraphAssembler {
    registry: Arc<ToolRegistry>,
    providers: Arc<dyn ProviderFactory>,
    defaults: AssemblyConfig,
    worker_policy: ExecutionPolicy,
    supervisor_policy: ExecutionPolicy,
}

impl GraphAssembler {
    pub fn new(registry: Arc<ToolRegistry>, providers: Arc<dyn ProviderFactory>) -> Self {
        Self {
            registry,
            providers,
            defaults: default_assembly(),
            worker_policy: ExecutionPolicy::default(),
            supervisor_policy: ExecutionPolicy::delegation(),
        }
    }

    pub fn with_defaults(mut self, defaults: AssemblyConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_worker_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.worker_policy = policy;
        self
    }

    pub fn with_supervisor_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.supervisor_policy = policy;
        self
    }

    /// Assemble the full graph: resolve configuration, build every worker,
    /// then build the supervisor over them. Every step fails fast; on error
    /// no agent is handed out.
    pub fn assemble(&self, overrides: &AssemblyOverrides) -> Result<SupervisorAgent, AssemblyError> {
        let config = resolve_assembly(&self.defaults, overrides)?;

        let mut names = BTreeSet::new();
        for worker in &config.workers {
            if !names.insert(worker.name.clone()) {
                return Err(AssemblyError::DuplicateAgent(worker.name.clone()));
            }
        }
        // Workers are built strictly before the supervisor, so the supervisor
        // can never end up in its own callable set.
        if names.contains(&config.supervisor.name) {
            return Err(AssemblyError::SelfReference(config.supervisor.name.clone()));
        }

        let mut workers = Vec::with_capacity(config.workers.len());
        for worker_config in config.workers {
            workers.push(Arc::new(self.build_worker(worker_config)?));
        }

        let provider = self.providers.create(&config.supervisor.model)?;
        info!(
            supervisor = %config.supervisor.name,
            workers = workers.len(),
            "assembled agent graph"
        );

        Ok(SupervisorAgent::new(
            config.supervisor,
            provider,
            workers,
            self.supervisor_policy.clone(),
        ))
    }

    /// Assemble a single configured worker for standalone use.
    pub fn assemble_worker(
        &self,
        name: &str,
        overrides: &AssemblyOverrides,
    ) -> Result<WorkerAgent, AssemblyError> {
        let config = resolve_assembly(&self.defaults, overrides)?;
        let worker_config = config
            .workers
            .into_iter()
            .find(|w| w.name == name)
            .ok_or_else(|| AssemblyError::UnknownAgent(name.to_string()))?;
        self.build_worker(worker_config)
    }

    fn build_worker(&self, config: AgentConfig) -> Result<WorkerAgent, AssemblyError> {
        let tools = self.registry.resolve(&config.selected_tools)?;
        let provider = self.providers.create(&config.model)?;
        Ok(WorkerAgent::new(
            config,
            provider,
            ToolSet::new(tools),
            self.worker_policy.clone(),
        ))
    }

    /// Top-level entry point: assemble the supervisor graph and run one task
    /// to completion.
    pub async fn run(
        &self,
        task: &str,
        overrides: &AssemblyOverrides,
    ) -> Result<String, RunError> {
        let supervisor = self.assemble(overrides)?;
        let outcome = supervisor
            .run(task)
            .await
            .map_err(RunError::Supervisor)?;
        Ok(outcome.answer)
    }

    /// Standalone entry point: assemble one worker and invoke it directly.
    pub async fn run_worker(
        &self,
        name: &str,
        task: &str,
        overrides: &AssemblyOverrides,
    ) -> Result<String, RunError> {
        let worker = self.assemble_worker(name, overrides)?;
        worker.invoke(task).await.map_err(|source| RunError::Worker {
            agent: name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentOverrides, defaults};
    use crate::error::ConfigError;
    use crate::testing::{Canned, FixedTool, ScriptedProvider, call, text};
    use crate::traits::Provider;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Hands out a fresh scripted provider per `create`, keyed by model id.
    struct ScriptedFactory {
        scripts: Mutex<BTreeMap<String, Vec<Canned>>>,
        created: Mutex<Vec<String>>,
    }

    impl ScriptedFactory {
        fn new(scripts: &[(&str, Vec<Canned>)]) -> Arc<Self> {
            Arc::new(Self {
                scripts: Mutex::new(
                    scripts
                        .iter()
                        .map(|(model, script)| (model.to_string(), script.clone()))
                        .collect(),
                ),
                created: Mutex::new(vec![]),
            })
        }
    }

    impl ProviderFactory for ScriptedFactory {
        fn create(&self, model_id: &str) -> Result<Arc<dyn Provider>, AssemblyError> {
            self.created.lock().unwrap().push(model_id.to_string());
            let script = self
                .scripts
                .lock()
                .unwrap()
                .get(model_id)
                .cloned()
                .unwrap_or_default();
            Ok(ScriptedProvider::new(script))
        }
    }

    fn full_registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        for name in [
            "finance_research",
            "advanced_research",
            "basic_research",
            "get_todays_date",
        ] {
            registry.register(FixedTool::new(name, "ok")).unwrap();
        }
        Arc::new(registry)
    }

    fn empty_factory() -> Arc<ScriptedFactory> {
        ScriptedFactory::new(&[])
    }

    #[test]
    fn assembly_resolves_exactly_the_selected_tools() {
        let assembler = GraphAssembler::new(full_registry(), empty_factory());
        let supervisor = assembler.assemble(&AssemblyOverrides::default()).unwrap();

        let finance = supervisor.worker(defaults::FINANCE_AGENT).unwrap();
        let mut resolved: Vec<&str> = finance.tool_names();
        resolved.sort_unstable();
        let mut selected: Vec<&str> = finance
            .config()
            .selected_tools
            .iter()
            .map(String::as_str)
            .collect();
        selected.sort_unstable();
        assert_eq!(resolved, selected);
    }

    #[test]
    fn unregistered_tool_fails_assembly_naming_the_tool() {
        let mut registry = ToolRegistry::new();
        registry
            .register(FixedTool::new("get_todays_date", "ok"))
            .unwrap();
        let assembler = GraphAssembler::new(Arc::new(registry), empty_factory());

        let err = assembler.assemble(&AssemblyOverrides::default()).unwrap_err();
        assert!(matches!(err, AssemblyError::UnknownTool(name) if name == "finance_research"));
    }

    #[test]
    fn invalid_model_override_fails_assembly() {
        let assembler = GraphAssembler::new(full_registry(), empty_factory());
        let mut overrides = AssemblyOverrides::default();
        overrides.supervisor_model = Some("openai/gpt-2".to_string());

        let err = assembler.assemble(&overrides).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::Config(ConfigError::InvalidModel(_))
        ));
    }

    #[test]
    fn worker_named_like_the_supervisor_is_rejected() {
        let assembler = GraphAssembler::new(full_registry(), empty_factory());
        let mut overrides = AssemblyOverrides::default();
        overrides.agents.insert(
            "supervisor".to_string(),
            AgentOverrides {
                selected_tools: Some(vec!["get_todays_date".to_string()]),
                ..Default::default()
            },
        );

        let err = assembler.assemble(&overrides).unwrap_err();
        assert!(matches!(err, AssemblyError::SelfReference(name) if name == "supervisor"));
    }

    #[test]
    fn duplicate_worker_names_are_rejected() {
        let assembler = GraphAssembler::new(full_registry(), empty_factory());
        let mut overrides = AssemblyOverrides::default();
        overrides.agents.insert(
            defaults::RESEARCH_AGENT.to_string(),
            AgentOverrides {
                name: Some(defaults::FINANCE_AGENT.to_string()),
                ..Default::default()
            },
        );

        let err = assembler.assemble(&overrides).unwrap_err();
        assert!(matches!(err, AssemblyError::DuplicateAgent(name) if name == defaults::FINANCE_AGENT));
    }

    #[tokio::test]
    async fn assemble_twice_yields_independent_identical_runs() {
        // Distinct models per agent so each gets its own script.
        let factory = ScriptedFactory::new(&[
            (
                "openai/gpt-4.1",
                vec![
                    call("writing_agent", json!({"task": "write it"})),
                    text("final copy"),
                ],
            ),
            ("anthropic/claude-3-5-sonnet-latest", vec![text("draft")]),
        ]);
        let assembler = GraphAssembler::new(full_registry(), factory.clone());

        let mut overrides = AssemblyOverrides::default();
        for agent in [
            defaults::FINANCE_AGENT,
            defaults::RESEARCH_AGENT,
            defaults::WRITING_AGENT,
        ] {
            overrides.agents.insert(
                agent.to_string(),
                AgentOverrides {
                    model: Some("anthropic/claude-3-5-sonnet-latest".to_string()),
                    ..Default::default()
                },
            );
        }

        let first = assembler.assemble(&overrides).unwrap();
        let second = assembler.assemble(&overrides).unwrap();

        let a = first.run("write a post").await.unwrap();
        let b = second.run("write a post").await.unwrap();
        assert_eq!(a.answer, b.answer);
        assert_eq!(a.answer, "final copy");
        assert_eq!(a.iterations, b.iterations);

        // Each assembly built its own provider per agent: no shared state.
        assert_eq!(factory.created.lock().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn run_worker_surfaces_the_failing_stage() {
        let assembler = GraphAssembler::new(full_registry(), empty_factory());

        let err = assembler
            .run_worker("no_such_agent", "task", &AssemblyOverrides::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Assembly(AssemblyError::UnknownAgent(name)) if name == "no_such_agent"
        ));
    }

    #[tokio::test]
    async fn run_maps_loop_failure_to_the_supervisor_stage() {
        let assembler = GraphAssembler::new(full_registry(), empty_factory())
            .with_supervisor_policy(ExecutionPolicy::delegation().with_max_iterations(0));

        let err = assembler
            .run("task", &AssemblyOverrides::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Supervisor(_)));
    }
}
