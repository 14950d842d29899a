pub mod backtest;
pub mod config;
pub mod data;
pub mod metrics;
pub mod sweep;
pub mod validation;

// Re-export commonly used types
pub use backtest::{
    simulate, ResultRecord, ScalpingSimulator, SimulationConfig, SimulationError,
    SimulationResult, SimulationState,
};
pub use config::{AppConfig, ConfigError};
pub use data::{AuxReading, DataLoader, LoaderError, Observation, PriceTick};
pub use metrics::{MetricsCalculator, ScalpMetrics};
pub use sweep::{ParameterGrid, ParameterSweep};
pub use validation::{IntegrityReport, ObservationValidator};
