//! qlearn CLI - train tabular Q-learning agents and evaluate saved tables
//!
//! Logging goes through `tracing`; set `RUST_LOG` (for example
//! `RUST_LOG=qlearn=debug`) to see phase changes and finished games.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "qlearn")]
#[command(version, about = "Tabular Q-learning for board games and grid worlds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent on tic-tac-toe, connect four or the treasure hunt
    Train(Box<qlearn::cli::commands::train::TrainArgs>),

    /// Evaluate a saved Q-table with learning and exploration off
    Evaluate(qlearn::cli::commands::evaluate::EvaluateArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "qlearn=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => qlearn::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => qlearn::cli::commands::evaluate::execute(args),
    }
}
