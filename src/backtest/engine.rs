//! Core scalping simulation engine.
//!
//! Runs the simulation loop, once per observation in time order:
//! 1. Mark the futures hedge to market
//! 2. Value the gamma exposure on drift since the last hedge
//! 3. Compute the synthetic option delta and the net delta
//! 4. Rebalance the futures position when net delta leaves the band
//! 5. Record the ledger entry

use std::borrow::Cow;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::data::{is_time_ordered, Observation};

use super::commission::CommissionModel;
use super::state::{ResultRecord, SimulationState};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("No observations supplied")]
    EmptyInput,

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfiguration { field: &'static str, value: f64 },
}

/// Configuration for a scalping run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Option gamma proxy; option delta is `gamma * (price - start_price)`.
    pub gamma: f64,

    /// Transaction cost per futures contract traded.
    pub cost_per_contract: f64,

    /// Absolute net delta at which a rebalance is attempted.
    pub hedge_threshold: f64,

    /// Currency value of one point of the futures contract.
    pub contract_point_value: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gamma: 10.0,
            cost_per_contract: 10.0,
            hedge_threshold: 200.0,
            contract_point_value: 200.0,
        }
    }
}

impl SimulationConfig {
    /// Check every parameter is usable.
    ///
    /// A non-positive `hedge_threshold` is accepted: it rebalances whenever
    /// the net delta rounds to at least one lot.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let finite = [
            ("gamma", self.gamma),
            ("cost_per_contract", self.cost_per_contract),
            ("hedge_threshold", self.hedge_threshold),
            ("contract_point_value", self.contract_point_value),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(SimulationError::InvalidConfiguration { field, value });
            }
        }

        // Cost must not shrink the cumulative cost ledger
        if self.cost_per_contract < 0.0 {
            return Err(SimulationError::InvalidConfiguration {
                field: "cost_per_contract",
                value: self.cost_per_contract,
            });
        }

        if self.contract_point_value == 0.0 {
            return Err(SimulationError::InvalidConfiguration {
                field: "contract_point_value",
                value: self.contract_point_value,
            });
        }

        Ok(())
    }

    /// Commission model charged on every hedge.
    pub fn commission(&self) -> CommissionModel {
        CommissionModel::new(self.cost_per_contract)
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Configuration used.
    pub config: SimulationConfig,

    /// One entry per observation, in time order.
    pub records: Vec<ResultRecord>,

    /// Carry state after the last observation.
    pub final_state: SimulationState,
}

impl SimulationResult {
    /// Number of steps with a non-zero hedge trade.
    pub fn hedge_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_hedge()).count()
    }

    /// Sum of absolute contracts traded.
    pub fn total_contracts_traded(&self) -> u64 {
        self.records
            .iter()
            .map(|r| r.trade_contracts.unsigned_abs())
            .sum()
    }

    /// Total PnL at the last step.
    pub fn final_total_pnl(&self) -> f64 {
        self.records.last().map(|r| r.total_pnl).unwrap_or(0.0)
    }

    /// Cumulative transaction cost paid.
    pub fn total_cost(&self) -> f64 {
        self.final_state.total_cost_cum
    }

    /// Ledger entries where a hedge trade occurred.
    pub fn trades(&self) -> impl Iterator<Item = &ResultRecord> {
        self.records.iter().filter(|r| r.is_hedge())
    }

    /// First and last timestamps covered.
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }
}

/// The gamma scalping simulator.
pub struct ScalpingSimulator {
    config: SimulationConfig,
}

impl ScalpingSimulator {
    /// Create a new simulator.
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Run the simulation over `observations`.
    ///
    /// Input that is not ordered by timestamp is stable-sorted first; ordered
    /// input is consumed as given. Empty input is rejected.
    pub fn run(&self, observations: &[Observation]) -> Result<SimulationResult, SimulationError> {
        self.config.validate()?;

        if observations.is_empty() {
            return Err(SimulationError::EmptyInput);
        }

        let observations: Cow<'_, [Observation]> = if is_time_ordered(observations) {
            Cow::Borrowed(observations)
        } else {
            warn!("Observations are not ordered by timestamp, sorting before simulation");
            let mut sorted = observations.to_vec();
            sorted.sort_by_key(|o| o.timestamp);
            Cow::Owned(sorted)
        };

        let start_price = observations[0].mid_price;

        info!(
            "Simulating {} observations from start price {} (gamma {}, threshold {}, point value {})",
            observations.len(),
            start_price,
            self.config.gamma,
            self.config.hedge_threshold,
            self.config.contract_point_value
        );

        let mut state = SimulationState::new(start_price);
        let records: Vec<ResultRecord> = observations
            .iter()
            .map(|obs| state.step(obs, &self.config))
            .collect();

        let result = SimulationResult {
            config: self.config,
            records,
            final_state: state,
        };

        info!(
            "Simulation complete: {} hedges, {} contracts traded, final total PnL {:.2}",
            result.hedge_count(),
            result.total_contracts_traded(),
            result.final_total_pnl()
        );

        Ok(result)
    }
}

/// Run a simulation and return only the ledger.
pub fn simulate(
    observations: &[Observation],
    config: &SimulationConfig,
) -> Result<Vec<ResultRecord>, SimulationError> {
    ScalpingSimulator::new(*config)
        .run(observations)
        .map(|result| result.records)
}
