//! Error types for LedgerScan Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// The CSV input could not be read at all
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    /// A required header row is missing or empty
    #[error("Missing header row")]
    MissingHeader,

    /// An internal consistency check failed during feature computation
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::CsvParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
