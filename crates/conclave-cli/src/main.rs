mod config;

use clap::{Parser, Subcommand};
use conclave_orchestrator::profiles::system_prompt;
use conclave_orchestrator::{AgentRole, ContextMode, FailureMode, MultiAgentSystem};
use config::ConclaveConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "conclave.toml";

#[derive(Parser)]
#[command(name = "conclave", about = "Conclave: run a task through a team of role-based LLM agents")]
struct Cli {
    /// Path to config file (default: ./conclave.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one task through the pipeline
    Run {
        /// Natural-language task description
        description: String,
        /// Halt and fail the task at the first stage error
        #[arg(long)]
        strict: bool,
        /// Give this run its own agents instead of the shared set
        #[arg(long)]
        isolated: bool,
        /// Print the full task record as JSON instead of plain text
        #[arg(long)]
        json: bool,
        /// Print per-agent metrics after the run
        #[arg(long)]
        metrics: bool,
    },
    /// List the agent roles and their system prompts
    Roles,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Commands::Roles => {
            for role in AgentRole::ALL {
                println!("{role}: {}", system_prompt(role));
            }
            Ok(())
        }
        Commands::Run {
            description,
            strict,
            isolated,
            json,
            metrics,
        } => {
            let (path, required) = match &cli.config {
                Some(path) => (path.clone(), true),
                None => (PathBuf::from(DEFAULT_CONFIG), false),
            };
            let mut config = ConclaveConfig::load(&path, required).await?;
            config.resolve_api_key(|var| std::env::var(var).ok())?;
            if strict {
                config.pipeline.failure_mode = FailureMode::Strict;
            }
            if isolated {
                config.pipeline.context_mode = ContextMode::Isolated;
            }

            info!(
                provider = ?config.model.provider,
                model = %config.model.model_id,
                "Starting pipeline"
            );

            let system = MultiAgentSystem::new(&config.model, config.pipeline);

            if !json {
                println!("Processing task: {description}");
            }
            let outcome = system.submit(&description).await;

            if json {
                let tasks = system.tasks().await;
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if let Ok(result) = &outcome {
                println!("Final result: {result}");
            }
            if metrics {
                println!("{}", serde_json::to_string_pretty(&system.monitor().to_json().await)?);
            }

            outcome?;
            Ok(())
        }
    }
}
