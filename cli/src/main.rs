use anyhow::Result;
use bureau_core::{
    AssemblyOverrides, EnvProviderFactory, GraphAssembler, config, tools,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bureau")]
#[command(about = "bureau - supervisor/worker agents for content production", long_about = None)]
struct Cli {
    /// Path to a TOML file with configuration overrides
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task through the supervisor graph
    Run { task: String },
    /// Invoke a single configured worker directly
    Agent { name: String, task: String },
    /// List the registered tools
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let overrides = match &cli.config {
        Some(path) => config::load_overrides(path)?,
        None => AssemblyOverrides::default(),
    };

    let search_api_key = std::env::var("TAVILY_API_KEY").ok();
    let registry = Arc::new(tools::default_registry(search_api_key)?);

    match cli.command {
        Commands::Tools => {
            for spec in registry.specs() {
                println!("{}: {}", spec.name, spec.description);
            }
        }
        Commands::Run { task } => {
            let assembler = GraphAssembler::new(registry, Arc::new(EnvProviderFactory::new()));
            let answer = assembler.run(&task, &overrides).await?;
            println!("{answer}");
        }
        Commands::Agent { name, task } => {
            let assembler = GraphAssembler::new(registry, Arc::new(EnvProviderFactory::new()));
            let answer = assembler.run_worker(&name, &task, &overrides).await?;
            println!("{answer}");
        }
    }

    Ok(())
}
