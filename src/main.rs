use clap::Parser;
use pit_backtest::cli::{Cli, Commands};
use pit_backtest::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load_or_default(&cli.config)?;

    // Initialize telemetry
    pit_backtest::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Backtest(args) => {
            tracing::info!("Starting backtest");
            args.execute(&config).await?;
        }
        Commands::Snapshot(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
