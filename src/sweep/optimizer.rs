//! Parameter sweep over gamma, cost and hedge threshold.
//!
//! Every combination is an independent simulation over the same observation
//! stream, so combinations run in parallel while each run stays sequential.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backtest::{ScalpingSimulator, SimulationConfig, SimulationError};
use crate::data::Observation;
use crate::metrics::{MetricsCalculator, ScalpMetrics};

/// Parameter values to sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterGrid {
    /// Gamma values.
    pub gamma: Vec<f64>,
    /// Cost per contract values.
    pub cost_per_contract: Vec<f64>,
    /// Hedge threshold values.
    pub hedge_threshold: Vec<f64>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            gamma: vec![5.0, 10.0, 20.0],
            cost_per_contract: vec![10.0],
            hedge_threshold: vec![100.0, 200.0, 400.0, 800.0],
        }
    }
}

impl ParameterGrid {
    /// Calculate total number of parameter combinations.
    pub fn total_combinations(&self) -> usize {
        self.gamma.len() * self.cost_per_contract.len() * self.hedge_threshold.len()
    }

    /// Generate all parameter combinations.
    pub fn combinations(&self) -> Vec<ParameterSet> {
        let mut combos = Vec::with_capacity(self.total_combinations());

        for &gamma in &self.gamma {
            for &cost_per_contract in &self.cost_per_contract {
                for &hedge_threshold in &self.hedge_threshold {
                    combos.push(ParameterSet {
                        gamma,
                        cost_per_contract,
                        hedge_threshold,
                    });
                }
            }
        }

        combos
    }
}

/// A single parameter combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub gamma: f64,
    pub cost_per_contract: f64,
    pub hedge_threshold: f64,
}

impl ParameterSet {
    /// Apply these parameters to a base configuration.
    pub fn apply_to_config(&self, config: &mut SimulationConfig) {
        config.gamma = self.gamma;
        config.cost_per_contract = self.cost_per_contract;
        config.hedge_threshold = self.hedge_threshold;
    }

    /// Short label for logs and reports.
    pub fn key(&self) -> String {
        format!(
            "g{}_c{}_t{}",
            self.gamma, self.cost_per_contract, self.hedge_threshold
        )
    }
}

/// Outcome of one combination.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub params: ParameterSet,
    pub result: Result<ScalpMetrics, SimulationError>,
}

impl SweepOutcome {
    fn final_pnl(&self) -> Option<f64> {
        self.result.as_ref().ok().map(|m| m.final_total_pnl)
    }
}

/// Runs a parameter grid against one observation stream.
pub struct ParameterSweep {
    base_config: SimulationConfig,
    grid: ParameterGrid,
}

impl ParameterSweep {
    pub fn new(base_config: SimulationConfig, grid: ParameterGrid) -> Self {
        Self { base_config, grid }
    }

    /// Evaluate every combination, best final total PnL first.
    ///
    /// Failed combinations are kept and sorted last.
    pub fn run(&self, observations: &[Observation]) -> Vec<SweepOutcome> {
        let combinations = self.grid.combinations();
        let total = combinations.len();
        info!("Parameter combinations: {}", total);

        let progress = AtomicUsize::new(0);

        let mut outcomes: Vec<SweepOutcome> = combinations
            .par_iter()
            .map(|params| {
                let mut config = self.base_config;
                params.apply_to_config(&mut config);

                let result = ScalpingSimulator::new(config)
                    .run(observations)
                    .map(|r| MetricsCalculator::calculate(&r));

                let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
                if done % (total / 10).max(1) == 0 || done == total {
                    info!(
                        "  {:.0}% ({}/{} combinations)",
                        done as f64 / total as f64 * 100.0,
                        done,
                        total
                    );
                }

                SweepOutcome {
                    params: *params,
                    result,
                }
            })
            .collect();

        outcomes.sort_by(|a, b| match (a.final_pnl(), b.final_pnl()) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        if let Some(best) = outcomes.first().filter(|o| o.result.is_ok()) {
            info!(
                "Best params = {}, final total PnL = {:.2}",
                best.params.key(),
                best.final_pnl().unwrap_or_default()
            );
        }

        outcomes
    }
}
