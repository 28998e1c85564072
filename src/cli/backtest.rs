//! Backtest command implementation

use super::OutputFormat;
use crate::analytics::MetricsReport;
use crate::backtest::{BacktestRun, Backtester};
use crate::config::Config;
use crate::data::{self, ParquetWriter};
use anyhow::Context;
use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct BacktestArgs {
    /// Override the price lookback
    #[arg(long)]
    pub n_prices: Option<usize>,

    /// Override the ratio lookback
    #[arg(long)]
    pub n_ratios: Option<usize>,

    /// Override the rebalance stride
    #[arg(long)]
    pub frequency: Option<usize>,

    /// Evaluate rebalance dates in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Output directory for results
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl BacktestArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        if let Some(n) = self.n_prices {
            config.simulation.n_prices = n;
        }
        if let Some(n) = self.n_ratios {
            config.simulation.n_ratios = n;
        }
        if let Some(f) = self.frequency {
            config.simulation.frequency = f;
        }
        config.simulation.parallel |= self.parallel;
        config.validate()?;

        let output_dir = self
            .output
            .clone()
            .unwrap_or_else(|| config.data.output_dir.clone());

        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        let mut task = tokio::task::spawn_blocking(move || run(&config, &flag));

        let (run, report) = tokio::select! {
            joined = &mut task => joined??,
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupt received, stopping backtest");
                cancel.store(true, Ordering::Relaxed);
                task.await??
            }
        };

        write_outputs(&output_dir, &run, &report)?;

        let summary = report.summary();
        match self.format {
            OutputFormat::Table => println!("{}", summary.format_table()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        }

        Ok(())
    }
}

fn run(config: &Config, cancel: &AtomicBool) -> anyhow::Result<(BacktestRun, MetricsReport)> {
    let store = data::load_store(
        &config.data.prices_path,
        &config.data.ratios_path,
        config.data.max_date,
    )?;
    let strategy = config.strategy.build();

    let mut backtester = Backtester::new(store, config.metrics.clone())?;
    let run = backtester
        .rolling_test_until(&*strategy, config.simulation, cancel)?
        .clone();
    let report = backtester.metrics()?;
    Ok((run, report))
}

fn write_outputs(
    output_dir: &std::path::Path,
    run: &BacktestRun,
    report: &MetricsReport,
) -> anyhow::Result<()> {
    let writer = ParquetWriter::new(output_dir);
    writer.ensure_dir()?;
    let run_id = run.run_id.to_string();

    let investments_path = writer.file_path("investments", &run_id, "json");
    let file = File::create(&investments_path)
        .with_context(|| format!("Failed to create {}", investments_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &run.investments)?;

    let metrics_path = writer.file_path("metrics", &run_id, "json");
    let file = File::create(&metrics_path)
        .with_context(|| format!("Failed to create {}", metrics_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;

    let returns_path = writer.file_path("returns", &run_id, "parquet");
    writer.write_returns(&returns_path, &run.results)?;

    tracing::info!(
        %run_id,
        output_dir = %output_dir.display(),
        "Wrote backtest outputs"
    );
    Ok(())
}
