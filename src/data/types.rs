//! Core data types for the scalping backtester.
//!
//! These types represent the inputs supplied to the simulator: raw futures
//! mid-price ticks, auxiliary (volatility) readings, and the merged
//! observation stream the simulator folds over.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single futures mid-price at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub timestamp: NaiveDateTime,
    pub mid_price: f64,
}

impl PriceTick {
    pub fn new(timestamp: NaiveDateTime, mid_price: f64) -> Self {
        Self {
            timestamp,
            mid_price,
        }
    }
}

/// An auxiliary reading (e.g. a VIX-like volatility index) at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuxReading {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl AuxReading {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// One input step of the simulation.
///
/// The auxiliary reading is only present when a prior as-of join found a
/// reading at or before `timestamp`. It is carried through to the output
/// ledger untouched and never enters the PnL arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation time.
    pub timestamp: NaiveDateTime,

    /// Futures mid price.
    pub mid_price: f64,

    /// Auxiliary reading joined onto this observation, if any.
    pub aux_reading: Option<f64>,
}

impl Observation {
    /// Create an observation without an auxiliary reading.
    pub fn new(timestamp: NaiveDateTime, mid_price: f64) -> Self {
        Self {
            timestamp,
            mid_price,
            aux_reading: None,
        }
    }

    /// Attach an auxiliary reading. NaN is treated as absent.
    pub fn with_aux(mut self, value: f64) -> Self {
        self.aux_reading = if value.is_nan() { None } else { Some(value) };
        self
    }

    /// Calendar month (1-12) of the observation.
    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }
}

impl From<PriceTick> for Observation {
    fn from(tick: PriceTick) -> Self {
        Self::new(tick.timestamp, tick.mid_price)
    }
}

/// Check that a sequence is non-decreasing by timestamp.
pub fn is_time_ordered(observations: &[Observation]) -> bool {
    observations
        .windows(2)
        .all(|w| w[0].timestamp <= w[1].timestamp)
}
