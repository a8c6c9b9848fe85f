//! VeloNode Worker
//!
//! Polls the job backend, claims open jobs and reports results.

mod style;

mod commands {
    pub mod balance;
    pub mod jobs;
    pub mod run;
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use velonode_worker::WorkerConfig;

#[derive(Parser, Debug)]
#[command(name = "velonode-worker")]
#[command(about = "VeloNode polling worker - claims open jobs and submits results")]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "VELONODE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, env = "VELONODE_BACKEND_URL", global = true)]
    backend_url: Option<String>,

    /// Fixed worker name instead of a generated one
    #[arg(long, env = "VELONODE_WORKER_NAME", global = true)]
    worker_name: Option<String>,

    /// Seconds between poll cycles
    #[arg(long, env = "VELONODE_POLL_INTERVAL", global = true)]
    poll_interval: Option<u64>,

    /// Seconds of simulated work per job
    #[arg(long, env = "VELONODE_WORK_DURATION", global = true)]
    work_duration: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll for jobs forever (default)
    Run,

    /// List jobs on the backend
    Jobs {
        /// Include assigned and completed jobs
        #[arg(long)]
        all: bool,
    },

    /// Show an account's credit balance
    Balance {
        /// Account to look up (defaults to --worker-name)
        #[arg(long)]
        username: Option<String>,
    },
}

fn load_config(cli: &Cli) -> Result<WorkerConfig> {
    let mut config = match &cli.config {
        Some(path) => WorkerConfig::from_file(path)?,
        None => WorkerConfig::default(),
    };

    if let Some(url) = &cli.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(name) = &cli.worker_name {
        config.worker_name = Some(name.clone());
    }
    if let Some(secs) = cli.poll_interval {
        config.poll_interval_secs = secs;
    }
    if let Some(secs) = cli.work_duration {
        config.work_duration_secs = secs;
    }

    config.normalize();
    Ok(config)
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries progress dots and command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("velonode_worker=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        style::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(config).await,
        Commands::Jobs { all } => commands::jobs::run(&config, all).await,
        Commands::Balance { username } => commands::balance::run(&config, username).await,
    }
}
