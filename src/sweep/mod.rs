//! Parameter sweeps.
//!
//! Grid search over simulation parameters with parallel evaluation.

pub mod optimizer;

pub use optimizer::{ParameterGrid, ParameterSet, ParameterSweep, SweepOutcome};
