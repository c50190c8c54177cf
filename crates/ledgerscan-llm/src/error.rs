//! Error types for the LLM module

use thiserror::Error;

/// Result type alias for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// LLM module errors
#[derive(Debug, Error)]
pub enum LLMError {
    /// No API key was supplied for a provider that needs one
    #[error("Missing credential: {0} API key is not configured")]
    MissingCredential(String),

    /// External API call failed
    #[error("External API call failed: {0}")]
    ApiCallFailed(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Invalid response format
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl LLMError {
    /// Whether the error comes from missing or wrong configuration rather than the call itself
    pub fn is_configuration(&self) -> bool {
        matches!(self, LLMError::MissingCredential(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_display() {
        let err = LLMError::MissingCredential("Gemini".to_string());
        assert_eq!(
            err.to_string(),
            "Missing credential: Gemini API key is not configured"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_api_failure_is_not_configuration() {
        let err = LLMError::ApiCallFailed("quota exceeded".to_string());
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_serialization_error_converts() {
        let source = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err: LLMError = source.into();

        assert!(matches!(err, LLMError::SerializationError(_)));
        assert!(!err.is_configuration());
    }
}
