//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "watchprice")]
#[command(author, version, about = "Trading-hours aware watchlist quote monitor")]
pub struct Cli {
    /// Configuration file path (JSON, or TOML by extension)
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    /// Price record journal (CSV)
    #[arg(short, long, global = true, default_value = "watchprice.csv")]
    pub journal: PathBuf,

    /// Log level
    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Also write logs to a daily rolling file at this path
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Monitor the watchlist until interrupted
    Run(RunArgs),
    /// Resolve quotes once and print them
    Quote(QuoteArgs),
    /// Aggregate journaled prices into time buckets
    Aggregate(AggregateArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum NotifierKind {
    /// Native desktop notifications
    Desktop,
    /// Log alerts only
    Log,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Alert delivery
    #[arg(short, long, default_value = "desktop")]
    pub notifier: NotifierKind,
}

#[derive(clap::Args)]
pub struct QuoteArgs {
    /// Symbols to resolve; defaults to the configured watchlist
    pub symbols: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
}

#[derive(clap::Args)]
pub struct AggregateArgs {
    /// Symbol as journaled, e.g. sh600000
    #[arg(short, long)]
    pub symbol: String,

    /// Bucket width in minutes
    #[arg(short, long, default_value = "1")]
    pub interval: u32,

    /// Number of most recent buckets to keep
    #[arg(long, default_value = "240")]
    pub limit: usize,

    /// Output format
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,
}
