//! Watchlist quote monitor CLI.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use watchprice_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held for the lifetime of the process so file logs are flushed
    let _log_guard = setup_logging(cli.log_level.as_str(), cli.json_logs, cli.log_file.as_deref());

    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, &cli.config, &cli.journal).await,
        Commands::Quote(args) => cli::commands::quote::run(args, &cli.config).await,
        Commands::Aggregate(args) => cli::commands::aggregate::run(args, &cli.journal).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
