//! Commission model for futures hedge trades.
//!
//! Default: 10 currency units per contract, charged on every rebalance.

use serde::{Deserialize, Serialize};

/// Flat per-contract commission model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommissionModel {
    /// Cost per futures contract traded, in currency units.
    pub per_contract: f64,
}

impl Default for CommissionModel {
    fn default() -> Self {
        Self { per_contract: 10.0 }
    }
}

impl CommissionModel {
    /// Create a new commission model.
    pub fn new(per_contract: f64) -> Self {
        Self { per_contract }
    }

    /// Commission for a trade of `contracts` (sign ignored).
    pub fn calculate(&self, contracts: i64) -> f64 {
        contracts.unsigned_abs() as f64 * self.per_contract
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_commission() {
        let model = CommissionModel::default();
        assert_eq!(model.per_contract, 10.0);
    }

    #[test]
    fn test_commission_ignores_side() {
        let model = CommissionModel::default();

        assert_eq!(model.calculate(3), 30.0);
        assert_eq!(model.calculate(-3), 30.0);
    }

    #[test]
    fn test_fractional_rate() {
        let model = CommissionModel::new(2.5);
        assert_eq!(model.calculate(-4), 10.0);
    }

    #[test]
    fn test_zero_commission() {
        let model = CommissionModel::new(0.0);
        assert_eq!(model.calculate(100), 0.0);
    }
}
