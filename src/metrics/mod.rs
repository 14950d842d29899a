//! Performance metrics module.
//!
//! Provides summary statistics over a simulation ledger:
//! - Hedge count and total contracts traded
//! - PnL attribution (gamma, futures, cost)
//! - Peak and maximum drawdown of total PnL
//! - Listing of the first hedge trades

pub mod calculator;

pub use calculator::{MetricsCalculator, ScalpMetrics};
