//! # action-thunk-cli
//!
//! Developer CLI for action thunks.
//!
//! - `action-thunk types <NAME>` — print the four lifecycle identifiers
//! - `action-thunk run <NAME>` — run a demo operation and print every
//!   notification it dispatches as a JSON line

mod commands;

use std::path::PathBuf;

use action_thunk::ThunkConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Drive operations through action thunks and watch their lifecycle.
#[derive(Parser)]
#[command(name = "action-thunk", version, about)]
struct Cli {
    /// Config file; missing files fall back to defaults.
    #[arg(long, global = true, default_value = "thunk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the identifiers an operation dispatches, in lifecycle order.
    Types {
        /// Operation name, e.g. FETCH.
        name: String,
    },
    /// Run a demo operation and print its notifications.
    Run(commands::run::RunArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with notifications on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("action_thunk=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let config = ThunkConfig::load_or_default(&cli.config);
    match &cli.command {
        Commands::Types { name } => commands::types::execute(name),
        Commands::Run(args) => commands::run::execute(args, &config),
    }
}
