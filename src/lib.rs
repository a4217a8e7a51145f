//! Period-over-period analytics for small-business tables.
//!
//! Load finance, inventory, supplier, customer and HR tables through a
//! [`loader::TableSource`], compare a period with the one right before it,
//! rank categories, and raise threshold alerts. Everything below the loader is
//! pure computation over [`dataset::TabularDataset`] snapshots.

pub mod alerts;
pub mod config;
pub mod dataset;
pub mod distribution;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod period;
pub mod reports;
pub mod types;
pub mod util;

pub use dataset::TabularDataset;
pub use error::{Error, Result};
pub use loader::{CsvTableSource, MemoryTableSource, TableSource};
pub use period::{previous_period, Period};
pub use reports::{build_report, Report};
pub use types::TableName;
