use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "achievement-ledger")]
#[command(about = "Per-player achievement progress, levels and rewards")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.achievement-ledger/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the catalog and level table and print a summary
    Check,

    /// Show the achievement level reached with a total score
    Level {
        /// Total score of completed achievements
        #[arg(long)]
        score: u32,
    },

    /// Apply a file of achievement events to a stored player
    Replay {
        /// YAML file with the events to apply
        events: PathBuf,

        /// Character id of the player
        #[arg(long)]
        player: u32,

        /// Apply events without saving the result
        #[arg(long)]
        dry_run: bool,
    },

    /// Write a default config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Check => {
            cli::check::check_command(config_path)?;
        }
        Commands::Level { score } => {
            cli::level::level_command(config_path, score)?;
        }
        Commands::Replay {
            events,
            player,
            dry_run,
        } => {
            cli::replay::replay_command(config_path, &events, player, dry_run).await?;
        }
        Commands::Init { force } => {
            cli::init::init_command(config_path, force)?;
        }
    }

    Ok(())
}
