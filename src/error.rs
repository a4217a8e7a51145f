use crate::types::TableName;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised outside the pure analytics core: date input, table loading
/// and export.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid period {start} .. {end}: {reason}")]
    InvalidPeriod {
        start: NaiveDate,
        end: NaiveDate,
        reason: &'static str,
    },

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("table {table} is unavailable: {source}")]
    TableUnavailable {
        table: TableName,
        #[source]
        source: Box<Error>,
    },

    #[error("table {table} has no '{column}' column to filter on")]
    MissingDateColumn {
        table: TableName,
        column: &'static str,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub fn unavailable(table: TableName, source: impl Into<Error>) -> Self {
        Self::TableUnavailable {
            table,
            source: Box::new(source.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
