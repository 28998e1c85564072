//! Snapshot command implementation

use super::OutputFormat;
use crate::config::Config;
use crate::data;
use chrono::NaiveDate;
use clap::Args;
use std::fmt::Write;

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Reference date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,

    /// Override the price lookback
    #[arg(long)]
    pub n_prices: Option<usize>,

    /// Override the ratio lookback
    #[arg(long)]
    pub n_ratios: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl SnapshotArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let n_prices = self.n_prices.unwrap_or(config.simulation.n_prices);
        let n_ratios = self.n_ratios.unwrap_or(config.simulation.n_ratios);
        if n_prices == 0 || n_ratios == 0 {
            anyhow::bail!("Lookback counts must be at least 1");
        }

        let paths = config.data.clone();
        let date = self.date;
        let (summary, entities) = tokio::task::spawn_blocking(move || {
            let store = data::load_store(&paths.prices_path, &paths.ratios_path, paths.max_date)?;
            let snapshot = store.snapshot(date, n_prices, n_ratios);
            let entities: Vec<String> = snapshot.entities().into_iter().map(String::from).collect();
            anyhow::Ok((snapshot.summary(), entities))
        })
        .await??;

        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "summary": summary,
                    "entity_ids": entities,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            OutputFormat::Table => {
                let mut out = String::new();
                writeln!(out, "Snapshot for {}", summary.reference_date)?;
                writeln!(out, "  Entities:     {}", summary.entities)?;
                writeln!(out, "  Price dates:  {}", join_dates(&summary.price_dates))?;
                writeln!(out, "  Ratio dates:  {}", join_dates(&summary.ratio_dates))?;
                if !entities.is_empty() {
                    writeln!(out, "  Entity ids:   {}", entities.join(", "))?;
                }
                print!("{}", out);
            }
        }

        Ok(())
    }
}

fn join_dates(dates: &[NaiveDate]) -> String {
    if dates.is_empty() {
        return "-".to_string();
    }
    dates
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
