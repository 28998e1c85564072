//! Configuration types for pit-backtest

use crate::analytics::MetricsConfig;
use crate::backtest::SimulationConfig;
use crate::strategy::StrategyConfig;
use crate::telemetry::TelemetryConfig;
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Input panels and output location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Parquet file with `(entity_id, date, ret)` rows
    #[serde(default = "default_prices_path")]
    pub prices_path: PathBuf,
    /// Parquet file with `(entity_id, date, <features>...)` rows
    #[serde(default = "default_ratios_path")]
    pub ratios_path: PathBuf,
    /// Drop every row dated after this
    #[serde(default)]
    pub max_date: Option<NaiveDate>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_prices_path() -> PathBuf {
    PathBuf::from("./data/prices.parquet")
}
fn default_ratios_path() -> PathBuf {
    PathBuf::from("./data/ratios.parquet")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            prices_path: default_prices_path(),
            ratios_path: default_ratios_path(),
            max_date: None,
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Like [`Config::load`], but a missing file yields the defaults
    pub fn load_or_default(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                eprintln!("Warning: {} not found, using default configuration", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read config {}", path.display())),
        }
    }

    fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section before any data is touched
    pub fn validate(&self) -> anyhow::Result<()> {
        self.simulation.validate()?;
        self.metrics.validate()?;
        if let StrategyConfig::Momentum { count: 0 } = self.strategy {
            anyhow::bail!("Invalid configuration: strategy count must be at least 1");
        }
        Ok(())
    }
}
