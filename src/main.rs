use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "ci-guard")]
#[command(version, about = "Block agent pushes until CI has passed")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Path to the guard config. Defaults to .config/ci-guard.toml in the project directory
    #[arg(long, global = true, env = "CI_GUARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a guard session: JSON events on stdin, one JSON response per event on stdout
    Serve,
    /// Resolve the gate setup and show pending unvalidated changes
    Status,
    /// Show how a shell command is classified
    Classify {
        /// Command text (joined with spaces)
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
}

fn init_tracing(verbose: bool) {
    // stdout carries the session protocol, so logs always go to stderr
    let filter = if verbose {
        EnvFilter::new("ci_guard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Serve => cmd::cmd_serve(&project_dir, cli.config.as_deref()).await?,
        Commands::Status => cmd::cmd_status(&project_dir, cli.config.as_deref()).await?,
        Commands::Classify { command } => {
            cmd::cmd_classify(&project_dir, cli.config.as_deref(), &command.join(" "))?
        }
        Commands::Config { command } => {
            cmd::cmd_config(&project_dir, cli.config.as_deref(), command.clone())?
        }
    }

    Ok(())
}
