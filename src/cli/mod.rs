//! CLI interface for pit-backtest
//!
//! Provides subcommands for:
//! - `backtest`: Run a rolling simulation over the configured panels
//! - `snapshot`: Inspect the point-in-time view for one date
//! - `config`: Show the effective configuration

mod backtest;
mod snapshot;

pub use backtest::BacktestArgs;
pub use snapshot::SnapshotArgs;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "pit-backtest")]
#[command(about = "Point-in-time cross-sectional equity backtester")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a rolling backtest
    Backtest(BacktestArgs),
    /// Show the snapshot a strategy would see on a date
    Snapshot(SnapshotArgs),
    /// Show configuration
    Config,
}

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
