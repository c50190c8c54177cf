//! SDK error types

use ledgerscan_core::CoreError;
use ledgerscan_llm::LLMError;
use ledgerscan_repository::RepositoryError;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Nothing to work on: no upload yet, or the upload produced no records
    #[error("No data: {0}")]
    NoData(String),

    /// The uploaded input could not be read
    #[error("Invalid input: {0}")]
    Input(String),

    /// Internal consistency failure while computing features
    #[error("Computation error: {0}")]
    Computation(String),

    /// A collaborator (scorer, store) is not configured
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// The stage is already in flight for this dataset
    #[error("Stage '{0}' is already running")]
    Busy(&'static str),

    /// The external fraud scorer call failed
    #[error("Fraud scorer ({provider}) failed: {message}. Check the scorer API key and quota")]
    Scorer { provider: String, message: String },

    /// The persistence call failed
    #[error("Persisting results to '{store}' failed: {message}. Check the endpoint URL and key")]
    Persistence { store: String, message: String },
}

impl SdkError {
    /// Map a scorer failure, keeping credential problems distinguishable
    pub(crate) fn from_scorer(provider: &str, err: LLMError) -> Self {
        if err.is_configuration() {
            SdkError::NotConfigured(err.to_string())
        } else {
            SdkError::Scorer {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Map a store failure, keeping configuration problems distinguishable
    pub(crate) fn from_store(store: &str, err: RepositoryError) -> Self {
        if err.is_configuration() {
            SdkError::NotConfigured(err.to_string())
        } else {
            SdkError::Persistence {
                store: store.to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl From<CoreError> for SdkError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvariantViolation(_) => SdkError::Computation(err.to_string()),
            CoreError::CsvParse(_) | CoreError::MissingHeader => SdkError::Input(err.to_string()),
        }
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
