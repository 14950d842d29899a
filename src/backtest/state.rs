//! Simulation state and the per-step hedging transition.
//!
//! The simulator is a left fold over the observation stream. Everything
//! carried from one step to the next lives in [`SimulationState`], so a
//! single transition can be exercised from any prior state.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::Observation;

use super::engine::SimulationConfig;

/// Ledger entry emitted for every observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub timestamp: NaiveDateTime,

    /// Futures mid price at this step.
    pub price: f64,

    /// Price drift since the last rebalance, measured before this step's hedge.
    pub ds: f64,

    /// Point-in-time value of the unhedged gamma exposure, `0.5 * gamma * ds^2`.
    pub gamma_pnl: f64,

    /// Futures contracts held after this step's hedge.
    pub futures_position: i64,

    /// Cumulative futures mark-to-market PnL.
    pub futures_pnl_cum: f64,

    /// Synthetic option delta, linear in drift since the start of the run.
    pub option_delta: f64,

    /// Option delta plus futures delta, after this step's hedge.
    pub net_delta: f64,

    /// Cumulative transaction cost.
    pub total_cost_cum: f64,

    /// `gamma_pnl + futures_pnl_cum - total_cost_cum`.
    pub total_pnl: f64,

    /// Contracts traded at this step (0 when no rebalance happened).
    pub trade_contracts: i64,

    /// Auxiliary reading carried through from the input.
    pub aux_reading: Option<f64>,
}

impl ResultRecord {
    /// Whether a rebalance trade happened at this step.
    pub fn is_hedge(&self) -> bool {
        self.trade_contracts != 0
    }
}

/// Carry state threaded through the simulation fold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// First observed price; origin of the option delta.
    pub start_price: f64,

    /// Price at the most recent non-zero rebalance.
    pub last_hedge_price: f64,

    /// Price at the previous step.
    pub prev_price: f64,

    /// Signed futures contracts held.
    pub futures_position: i64,

    /// Cumulative futures mark-to-market PnL.
    pub futures_pnl_cum: f64,

    /// Cumulative transaction cost paid.
    pub total_cost_cum: f64,
}

impl SimulationState {
    /// Flat state anchored at `start_price`.
    pub fn new(start_price: f64) -> Self {
        Self {
            start_price,
            last_hedge_price: start_price,
            prev_price: start_price,
            futures_position: 0,
            futures_pnl_cum: 0.0,
            total_cost_cum: 0.0,
        }
    }

    /// Advance the state by one observation and return its ledger entry.
    pub fn step(&mut self, observation: &Observation, config: &SimulationConfig) -> ResultRecord {
        let point_value = config.contract_point_value;
        let current_price = observation.mid_price;

        // Mark the open futures position to market
        let price_change = current_price - self.prev_price;
        self.futures_pnl_cum += self.futures_position as f64 * price_change * point_value;

        // Gamma PnL is valued on drift since the last hedge, not since the last tick
        let ds = current_price - self.last_hedge_price;
        let gamma_pnl = 0.5 * config.gamma * (ds * ds);

        let option_delta = config.gamma * (current_price - self.start_price);
        let mut net_delta = option_delta + self.futures_position as f64 * point_value;

        let mut trade_contracts = 0;
        if net_delta.abs() >= config.hedge_threshold {
            trade_contracts = hedge_lots(net_delta, point_value);

            // A crossing that rounds to zero lots leaves the drift clock running
            if trade_contracts != 0 {
                self.futures_position += trade_contracts;
                self.total_cost_cum += config.commission().calculate(trade_contracts);
                self.last_hedge_price = current_price;

                net_delta = option_delta + self.futures_position as f64 * point_value;

                debug!(
                    "Hedged {} contracts at {} (position {}, net delta {:.2})",
                    trade_contracts, current_price, self.futures_position, net_delta
                );
            }
        }

        let total_pnl = gamma_pnl + self.futures_pnl_cum - self.total_cost_cum;

        self.prev_price = current_price;

        ResultRecord {
            timestamp: observation.timestamp,
            price: current_price,
            ds,
            gamma_pnl,
            futures_position: self.futures_position,
            futures_pnl_cum: self.futures_pnl_cum,
            option_delta,
            net_delta,
            total_cost_cum: self.total_cost_cum,
            total_pnl,
            trade_contracts,
            aux_reading: observation.aux_reading,
        }
    }
}

/// Contracts to trade to flatten `net_delta`.
///
/// Rounds half to even, so 1.5 lots becomes 2 and 2.5 lots becomes 2.
pub fn hedge_lots(net_delta: f64, contract_point_value: f64) -> i64 {
    -((net_delta / contract_point_value).round_ties_even() as i64)
}
