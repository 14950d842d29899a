//! Data loader for futures price and auxiliary reading parquet files.
//!
//! Both files are flat tables with one row per timestamp. The timestamp
//! column may be stored as:
//! - a string (`%Y-%m-%d %H:%M:%S[.f]`, `%Y-%m-%dT%H:%M:%S[.f]`, RFC 3339, or `%Y-%m-%d`)
//! - a native datetime column (any time unit)
//! - an i64 holding epoch milliseconds

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::merge::{exclude_months, merge_asof_backward};
use super::types::{AuxReading, Observation, PriceTick};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Column names used when reading the input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Timestamp column (shared by both files).
    pub time: String,
    /// Mid-price column in the price file.
    pub price: String,
    /// Reading column in the auxiliary file.
    pub aux: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            time: "time".to_string(),
            price: "mkt_mid".to_string(),
            aux: "vix_like".to_string(),
        }
    }
}

/// Parquet loader producing the simulator's observation stream.
pub struct DataLoader {
    columns: ColumnNames,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(ColumnNames::default())
    }
}

impl DataLoader {
    /// Create a loader reading the given column names.
    pub fn new(columns: ColumnNames) -> Self {
        Self { columns }
    }

    /// Load a parquet file as a DataFrame restricted to `columns`.
    fn load_columns(&self, path: &Path, columns: &[&str]) -> Result<DataFrame, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::FileNotFound(path.display().to_string()));
        }

        let exprs: Vec<Expr> = columns.iter().map(|c| col(*c)).collect();
        let df = LazyFrame::scan_parquet(path, ScanArgsParquet::default())?
            .select(exprs)
            .collect()?;
        Ok(df)
    }

    /// Load futures mid-price ticks, sorted by timestamp.
    pub fn load_prices(&self, path: &Path) -> Result<Vec<PriceTick>, LoaderError> {
        let columns = [self.columns.time.as_str(), self.columns.price.as_str()];
        let df = self.load_columns(path, &columns)?;
        let pairs = self.read_series(&df, &self.columns.price, false)?;

        let mut ticks: Vec<_> = pairs
            .into_iter()
            .map(|(timestamp, price)| PriceTick::new(timestamp, price))
            .collect();
        ticks.sort_by_key(|t| t.timestamp);

        info!("Loaded {} price ticks from {}", ticks.len(), path.display());
        Ok(ticks)
    }

    /// Load auxiliary readings, sorted by timestamp.
    ///
    /// Null readings are kept as NaN so the as-of join still matches them
    /// and yields an absent reading rather than an older one.
    pub fn load_aux(&self, path: &Path) -> Result<Vec<AuxReading>, LoaderError> {
        let columns = [self.columns.time.as_str(), self.columns.aux.as_str()];
        let df = self.load_columns(path, &columns)?;
        let pairs = self.read_series(&df, &self.columns.aux, true)?;

        let mut readings: Vec<_> = pairs
            .into_iter()
            .map(|(timestamp, value)| AuxReading::new(timestamp, value))
            .collect();
        readings.sort_by_key(|r| r.timestamp);

        info!("Loaded {} aux readings from {}", readings.len(), path.display());
        Ok(readings)
    }

    /// Load, join and filter everything needed for one simulation run.
    pub fn load_observations(
        &self,
        price_path: &Path,
        aux_path: Option<&Path>,
        excluded_months: &[u32],
    ) -> Result<Vec<Observation>, LoaderError> {
        let prices = self.load_prices(price_path)?;
        let aux = match aux_path {
            Some(p) => self.load_aux(p)?,
            None => Vec::new(),
        };

        let merged = merge_asof_backward(&prices, &aux);
        let observations = exclude_months(merged, excluded_months);

        info!("Prepared {} observations", observations.len());
        Ok(observations)
    }

    /// Read (timestamp, value) pairs.
    ///
    /// Rows with a null timestamp are always skipped. Rows with a null value
    /// are skipped, or kept as NaN when `null_as_nan` is set.
    fn read_series(
        &self,
        df: &DataFrame,
        value_column: &str,
        null_as_nan: bool,
    ) -> Result<Vec<(NaiveDateTime, f64)>, LoaderError> {
        let timestamps = read_timestamps(df.column(&self.columns.time)?)?;

        let values = df.column(value_column)?.cast(&DataType::Float64)?;
        let values = values.f64()?;

        let mut pairs = Vec::with_capacity(df.height());
        let mut skipped = 0usize;
        for (ts, value) in timestamps.into_iter().zip(values.into_iter()) {
            match (ts, value) {
                (Some(ts), Some(value)) => pairs.push((ts, value)),
                (Some(ts), None) if null_as_nan => pairs.push((ts, f64::NAN)),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(
                "Skipped {} rows with null {} or {}",
                skipped, self.columns.time, value_column
            );
        }

        Ok(pairs)
    }
}

/// Decode a timestamp column of any supported physical type.
fn read_timestamps(column: &Column) -> Result<Vec<Option<NaiveDateTime>>, LoaderError> {
    match column.dtype() {
        DataType::String => Ok(column
            .str()?
            .into_iter()
            .map(|s| s.and_then(parse_timestamp))
            .collect()),
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = column.cast(&DataType::Int64)?;
            Ok(raw
                .i64()?
                .into_iter()
                .map(|v| v.and_then(|v| from_epoch(v, unit)))
                .collect())
        }
        DataType::Int64 => Ok(column
            .i64()?
            .into_iter()
            .map(|v| v.and_then(|v| from_epoch(v, TimeUnit::Milliseconds)))
            .collect()),
        other => Err(LoaderError::InvalidData(format!(
            "timestamp column {} has unexpected type {}",
            column.name(),
            other
        ))),
    }
}

/// Parse a timestamp string in one of the accepted layouts.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Convert an epoch offset in the given unit to a naive UTC timestamp.
fn from_epoch(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let per_second: i64 = match unit {
        TimeUnit::Milliseconds => 1_000,
        TimeUnit::Microseconds => 1_000_000,
        TimeUnit::Nanoseconds => 1_000_000_000,
    };
    let secs = value.div_euclid(per_second);
    let nanos = value.rem_euclid(per_second) * (1_000_000_000 / per_second);
    DateTime::from_timestamp(secs, nanos as u32).map(|dt| dt.naive_utc())
}
