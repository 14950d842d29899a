//! Input validation module.
//!
//! Checks an observation stream before it is handed to the simulator.

pub mod data_integrity;

pub use data_integrity::{CheckResult, IntegrityReport, ObservationValidator};
