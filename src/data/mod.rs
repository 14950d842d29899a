pub mod loader;
pub mod merge;
pub mod types;

pub use loader::{parse_timestamp, ColumnNames, DataLoader, LoaderError};
pub use merge::{exclude_months, merge_asof_backward};
pub use types::{is_time_ordered, AuxReading, Observation, PriceTick};
