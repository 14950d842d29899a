//! Gamma scalping backtest.
//!
//! This module holds the simulation core:
//! - Carry state and the per-step hedging transition
//! - Futures mark-to-market and cumulative cost tracking
//! - Commission model
//! - The simulator that folds the state over an observation stream

pub mod commission;
pub mod engine;
pub mod state;

pub use commission::CommissionModel;
pub use engine::{simulate, ScalpingSimulator, SimulationConfig, SimulationError, SimulationResult};
pub use state::{hedge_lots, ResultRecord, SimulationState};
