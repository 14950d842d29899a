//! Run configuration loaded from TOML.
//!
//! Every section has defaults, so a partial file (or an empty one) is a
//! valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backtest::SimulationConfig;
use crate::data::ColumnNames;
use crate::sweep::ParameterGrid;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid month {0} (expected 1-12)")]
    InvalidMonth(u32),
}

/// Where the input series live and how they are filtered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Futures mid-price parquet file.
    pub prices: PathBuf,

    /// Optional auxiliary reading parquet file.
    pub aux: Option<PathBuf>,

    /// Calendar months (1-12) to drop before simulation.
    pub exclude_months: Vec<u32>,

    /// Column names in the parquet files.
    pub columns: ColumnNames,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            prices: PathBuf::from("data/prices.parquet"),
            aux: None,
            exclude_months: Vec::new(),
            columns: ColumnNames::default(),
        }
    }
}

/// Report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of hedge trades listed in the report.
    pub max_trades_listed: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_trades_listed: 20,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub data: DataConfig,
    pub report: ReportConfig,
    pub sweep: ParameterGrid,
}

impl AppConfig {
    /// Load a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(&month) = self
            .data
            .exclude_months
            .iter()
            .find(|m| !(1..=12).contains(*m))
        {
            return Err(ConfigError::InvalidMonth(month));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.report.max_trades_listed, 20);
        assert_eq!(config.data.columns.price, "mkt_mid");
        assert!(config.data.exclude_months.is_empty());
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml(
            r#"
            [simulation]
            gamma = 12.5

            [data]
            prices = "data/TXF.parquet"
            aux = "data/vix.parquet"
            exclude_months = [9]

            [data.columns]
            aux = "vix"
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.gamma, 12.5);
        assert_eq!(config.simulation.hedge_threshold, 200.0);
        assert_eq!(config.data.prices, PathBuf::from("data/TXF.parquet"));
        assert_eq!(config.data.aux, Some(PathBuf::from("data/vix.parquet")));
        assert_eq!(config.data.exclude_months, vec![9]);
        assert_eq!(config.data.columns.aux, "vix");
        assert_eq!(config.data.columns.time, "time");
    }

    #[test]
    fn test_invalid_month() {
        let result = AppConfig::from_toml("[data]\nexclude_months = [13]");
        assert!(matches!(result, Err(ConfigError::InvalidMonth(13))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sweep]\ngamma = [1.0, 2.0]").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sweep.gamma, vec![1.0, 2.0]);
        assert_eq!(config.sweep.total_combinations(), 8);
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::from_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
