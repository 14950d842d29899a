//! Gamma scalping backtester CLI.
//!
//! # Usage
//!
//! ```bash
//! # Run a single simulation
//! gamma-scalp-backtest run --config config/default.toml
//!
//! # Override the input files and export the full ledger
//! gamma-scalp-backtest run --prices data/TXF.parquet --aux data/vix.parquet --output results/ledger.json
//!
//! # Sweep gamma / cost / threshold
//! gamma-scalp-backtest sweep --config config/default.toml
//!
//! # Check input integrity only
//! gamma-scalp-backtest validate --config config/default.toml
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::warn;

use gamma_scalp_backtest::{
    AppConfig, DataLoader, MetricsCalculator, Observation, ObservationValidator,
    ParameterSweep, ScalpingSimulator,
};

const SEPARATOR: &str = "============================================================";

#[derive(Parser)]
#[command(name = "gamma-scalp-backtest")]
#[command(about = "Delta-hedged gamma scalping simulator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Futures price parquet file (overrides config)
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Auxiliary reading parquet file (overrides config)
    #[arg(long)]
    aux: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation
    Run {
        #[command(flatten)]
        data: DataArgs,

        /// Write the full ledger as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a parameter sweep
    Sweep {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Validate input data
    Validate {
        #[command(flatten)]
        data: DataArgs,
    },
}

fn load_config(args: &DataArgs) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(prices) = &args.prices {
        config.data.prices = prices.clone();
    }
    if let Some(aux) = &args.aux {
        config.data.aux = Some(aux.clone());
    }

    Ok(config)
}

fn load_observations(config: &AppConfig) -> Result<Vec<Observation>> {
    let loader = DataLoader::new(config.data.columns.clone());
    let observations = loader
        .load_observations(
            &config.data.prices,
            config.data.aux.as_deref(),
            &config.data.exclude_months,
        )
        .context("Failed to load observations")?;

    let report = ObservationValidator::validate(&observations);
    for check in report.failed_checks() {
        warn!("{}: {}", check.name, check.message);
    }
    if !report.is_simulatable() {
        bail!("Input data failed validation: {}", report.summary());
    }

    Ok(observations)
}

fn cmd_run(config: AppConfig, output: Option<PathBuf>) -> Result<()> {
    let observations = load_observations(&config)?;

    let result = ScalpingSimulator::new(config.simulation)
        .run(&observations)
        .context("Simulation failed")?;

    if let Some((start, end)) = result.time_range() {
        println!("Period: {} to {}", start, end);
    }
    println!("Total Trades: {}", result.total_contracts_traded());
    println!("Final Total PnL: {:.2}", result.final_total_pnl());
    println!();
    println!(
        "First {} hedge trades:",
        config.report.max_trades_listed
    );
    print!(
        "{}",
        MetricsCalculator::trade_listing(&result.records, config.report.max_trades_listed)
    );
    println!();
    println!("{}", MetricsCalculator::calculate(&result).summary());

    if let Some(path) = output {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &result.records)?;
        println!("\nLedger written to {}", path.display());
    }

    Ok(())
}

fn cmd_sweep(config: AppConfig) -> Result<()> {
    let observations = load_observations(&config)?;

    let outcomes = ParameterSweep::new(config.simulation, config.sweep).run(&observations);

    println!("{}", SEPARATOR);
    println!("Parameter Sweep ({} combinations)", outcomes.len());
    println!("{}", SEPARATOR);
    println!(
        "{:>8} {:>8} {:>10} {:>8} {:>14} {:>14}",
        "gamma", "cost", "threshold", "trades", "total_pnl", "max_dd"
    );

    for outcome in &outcomes {
        let p = &outcome.params;
        match &outcome.result {
            Ok(m) => println!(
                "{:>8} {:>8} {:>10} {:>8} {:>14.2} {:>14.2}",
                p.gamma,
                p.cost_per_contract,
                p.hedge_threshold,
                m.total_contracts_traded,
                m.final_total_pnl,
                m.max_drawdown
            ),
            Err(e) => println!(
                "{:>8} {:>8} {:>10}  error: {}",
                p.gamma, p.cost_per_contract, p.hedge_threshold, e
            ),
        }
    }

    Ok(())
}

fn cmd_validate(config: AppConfig) -> Result<()> {
    let loader = DataLoader::new(config.data.columns.clone());
    let observations = loader
        .load_observations(
            &config.data.prices,
            config.data.aux.as_deref(),
            &config.data.exclude_months,
        )
        .context("Failed to load observations")?;

    let report = ObservationValidator::validate(&observations);

    println!("{}", report.summary());
    for check in &report.checks {
        let status = if check.passed { "PASS" } else { "FAIL" };
        println!("  [{}] {}: {}", status, check.name, check.message);
        if let Some(details) = &check.details {
            println!("         {}", details);
        }
    }

    if !report.is_simulatable() {
        bail!("Input data cannot be simulated");
    }

    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gamma_scalp_backtest=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { data, output } => cmd_run(load_config(&data)?, output),
        Commands::Sweep { data } => cmd_sweep(load_config(&data)?),
        Commands::Validate { data } => cmd_validate(load_config(&data)?),
    }
}
