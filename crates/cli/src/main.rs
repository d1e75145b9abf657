//! Quiesce CLI - qd command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod util;

/// Quiesce - replay call schedules against a debouncer
#[derive(Parser)]
#[command(name = "qd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a call schedule and print each API invocation
    Replay {
        /// Quiet period in milliseconds (default: 500)
        #[arg(long)]
        wait: Option<u64>,
        /// Burst ceiling in milliseconds (default: 600)
        #[arg(long)]
        max_wait: Option<u64>,
        /// Fire on the first call of a burst (default: true)
        #[arg(long)]
        leading: Option<bool>,
        /// Fire after the quiet period (default: true)
        #[arg(long)]
        trailing: Option<bool>,
        /// Load options from a TOML file; flags override it
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Comma-separated call offsets in milliseconds
        #[arg(short, long, default_value = "0,100,200,300,1000,3000")]
        schedule: String,
    },
    /// Inspect debounce configuration files
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print an example configuration
    Example,
    /// Validate a configuration file and show the effective options
    Check {
        /// Path to the TOML file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { wait, max_wait, leading, trailing, config, schedule } => {
            let overrides = util::Overrides { wait, max_wait, leading, trailing };
            cmd::replay::run(config.as_deref(), overrides, &schedule).await
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Example => cmd::config::run_example().await,
            ConfigCommands::Check { path } => cmd::config::run_check(&path).await,
        },
    }
}
