//! Scalping performance metrics calculator.
//!
//! Summarizes a result ledger: trading activity, PnL attribution and
//! drawdown of the total PnL path.

use serde::{Deserialize, Serialize};

use crate::backtest::{ResultRecord, SimulationResult};

/// Summary statistics for one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalpMetrics {
    // Activity
    pub observations: usize,
    pub hedge_count: usize,
    pub total_contracts_traded: u64,
    pub max_abs_position: i64,
    pub final_position: i64,

    // PnL attribution at the last step
    pub final_gamma_pnl: f64,
    pub final_futures_pnl: f64,
    pub total_cost: f64,
    pub final_total_pnl: f64,

    // Path statistics
    pub peak_total_pnl: f64,
    pub max_drawdown: f64,
}

impl ScalpMetrics {
    /// Generate a summary report.
    pub fn summary(&self) -> String {
        format!(
            "Gamma Scalping Summary\n\
             ======================\n\
             Observations: {}\n\
             Hedges: {}\n\
             Total Trades: {}\n\
             Max |Position|: {}\n\
             Final Position: {}\n\
             \n\
             Gamma PnL: {:.2}\n\
             Futures PnL: {:.2}\n\
             Total Cost: {:.2}\n\
             Final Total PnL: {:.2}\n\
             \n\
             Peak Total PnL: {:.2}\n\
             Max Drawdown: {:.2}",
            self.observations,
            self.hedge_count,
            self.total_contracts_traded,
            self.max_abs_position,
            self.final_position,
            self.final_gamma_pnl,
            self.final_futures_pnl,
            self.total_cost,
            self.final_total_pnl,
            self.peak_total_pnl,
            self.max_drawdown,
        )
    }
}

/// Calculator for scalping metrics.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Calculate metrics for a completed run.
    pub fn calculate(result: &SimulationResult) -> ScalpMetrics {
        Self::from_records(&result.records)
    }

    /// Calculate metrics from a ledger.
    pub fn from_records(records: &[ResultRecord]) -> ScalpMetrics {
        let Some(last) = records.last() else {
            return ScalpMetrics::default();
        };

        let (peak_total_pnl, max_drawdown) = Self::drawdown(records);

        ScalpMetrics {
            observations: records.len(),
            hedge_count: records.iter().filter(|r| r.is_hedge()).count(),
            total_contracts_traded: records
                .iter()
                .map(|r| r.trade_contracts.unsigned_abs())
                .sum(),
            max_abs_position: records
                .iter()
                .map(|r| r.futures_position.abs())
                .max()
                .unwrap_or(0),
            final_position: last.futures_position,
            final_gamma_pnl: last.gamma_pnl,
            final_futures_pnl: last.futures_pnl_cum,
            total_cost: last.total_cost_cum,
            final_total_pnl: last.total_pnl,
            peak_total_pnl,
            max_drawdown,
        }
    }

    /// Peak of the total PnL path and the largest fall from a running peak.
    fn drawdown(records: &[ResultRecord]) -> (f64, f64) {
        let mut peak = f64::NEG_INFINITY;
        let mut max_drawdown = 0.0_f64;

        for record in records {
            peak = peak.max(record.total_pnl);
            max_drawdown = max_drawdown.max(peak - record.total_pnl);
        }

        (peak, max_drawdown)
    }

    /// Render the first `limit` hedge trades as a table.
    pub fn trade_listing(records: &[ResultRecord], limit: usize) -> String {
        let mut out = format!(
            "{:<20} {:>10} {:>8} {:>12} {:>8} {:>12} {:>12} {:>6}\n",
            "time", "price", "ds", "gamma_pnl", "fut_pos", "fut_pnl", "total_pnl", "trade"
        );

        for r in records.iter().filter(|r| r.is_hedge()).take(limit) {
            out.push_str(&format!(
                "{:<20} {:>10.2} {:>8.2} {:>12.2} {:>8} {:>12.2} {:>12.2} {:>6}\n",
                r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                r.price,
                r.ds,
                r.gamma_pnl,
                r.futures_position,
                r.futures_pnl_cum,
                r.total_pnl,
                r.trade_contracts,
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::{ScalpingSimulator, SimulationConfig};
    use crate::data::Observation;
    use chrono::NaiveDate;

    fn run(prices: &[f64]) -> SimulationResult {
        let observations: Vec<_> = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let ts = NaiveDate::from_ymd_opt(2025, 2, 3)
                    .unwrap()
                    .and_hms_opt(9, i as u32, 0)
                    .unwrap();
                Observation::new(ts, p)
            })
            .collect();
        ScalpingSimulator::new(SimulationConfig::default())
            .run(&observations)
            .unwrap()
    }

    #[test]
    fn test_metrics_empty() {
        let metrics = MetricsCalculator::from_records(&[]);
        assert_eq!(metrics, ScalpMetrics::default());
    }

    #[test]
    fn test_metrics_three_step() {
        let metrics = MetricsCalculator::calculate(&run(&[100.0, 130.0, 120.0]));

        assert_eq!(metrics.observations, 3);
        assert_eq!(metrics.hedge_count, 2);
        assert_eq!(metrics.total_contracts_traded, 3);
        assert_eq!(metrics.max_abs_position, 2);
        assert_eq!(metrics.final_position, -1);
        assert_eq!(metrics.total_cost, 30.0);
        assert_eq!(metrics.final_total_pnl, 4470.0);
        assert_eq!(metrics.peak_total_pnl, 4480.0);
        assert_eq!(metrics.max_drawdown, 10.0);
    }

    #[test]
    fn test_summary_mentions_totals() {
        let metrics = MetricsCalculator::calculate(&run(&[100.0, 130.0]));
        let summary = metrics.summary();
        assert!(summary.contains("Total Trades: 2"));
        assert!(summary.contains("Final Total PnL: 4480.00"));
    }

    #[test]
    fn test_trade_listing_only_hedges() {
        let result = run(&[100.0, 101.0, 130.0, 120.0]);
        let listing = MetricsCalculator::trade_listing(&result.records, 1);

        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("2025-02-03 09:02:00"));
        assert!(lines[1].trim_end().ends_with("-2"));
    }
}
