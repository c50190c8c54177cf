//! Error types for the persistence layer

use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur while storing results
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Endpoint URL or credential missing for the configured source
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// API error (HTTP transport, non-success status, authentication)
    #[error("API error: {0}")]
    ApiError(String),

    /// Payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepositoryError {
    /// Whether the error stems from configuration rather than the call itself
    pub fn is_configuration(&self) -> bool {
        matches!(self, RepositoryError::MissingConfiguration(_))
    }
}
