use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "planbench")]
#[command(version, about = "Benchmark harness for comparing PDDL planners")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding planbench.toml and the domains directory (default: current dir)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every planner on every selected problem and record the results
    Run {
        /// Per-run timeout in seconds. Overrides planbench.toml and TIMEOUT_S.
        #[arg(long)]
        timeout: Option<u64>,
        /// Comma-separated domains to sweep, in order
        #[arg(long, value_delimiter = ',')]
        domains: Option<Vec<String>>,
        /// Number of problems per domain
        #[arg(long)]
        problems: Option<usize>,
        /// Directory for results, logs and manifest
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Aggregate a results table per domain and planner
    Summarize {
        /// Results table to read (default: configured results path)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Summary file to write (default: configured summary path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// View and manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default planbench.toml file
    Init,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "planbench=debug" } else { "planbench=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Planners run from the project dir, so every path handed to them must be absolute.
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => std::path::absolute(&dir)
            .with_context(|| format!("Failed to resolve project directory {}", dir.display()))?,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Run {
            timeout,
            domains,
            problems,
            out_dir,
        } => {
            let overrides = planbench::config::CliOverrides {
                timeout_s: *timeout,
                domains: domains.clone(),
                problems_per_domain: *problems,
                out_dir: out_dir.clone(),
            };
            cmd::cmd_run(&project_dir, overrides, cli.verbose).await?;
        }
        Commands::Summarize { input, output } => {
            cmd::cmd_summarize(&project_dir, input.as_deref(), output.as_deref())?;
        }
        Commands::Config { command } => cmd::cmd_config(&project_dir, command.clone())?,
    }

    Ok(())
}
