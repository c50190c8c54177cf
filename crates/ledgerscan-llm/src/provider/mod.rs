//! LLM provider implementations

use crate::client::LLMClient;
use crate::error::{LLMError, Result};

/// LLM provider trait
pub trait LLMProvider: LLMClient {
    /// Get the provider name
    fn provider_name(&self) -> &str;
}

mod gemini;
mod mock;
mod openai;

pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use openai::OpenAIProvider;

/// Refuse to call out without a key
pub(crate) fn require_api_key(api_key: &str, provider: &str) -> Result<()> {
    if api_key.trim().is_empty() {
        return Err(LLMError::MissingCredential(provider.to_string()));
    }
    Ok(())
}

/// Read a provider response, turning non-2xx statuses into `ApiCallFailed`
pub(crate) async fn read_json_body(
    resp: reqwest::Response,
    provider: &str,
) -> Result<serde_json::Value> {
    let status = resp.status();
    let resp_text = resp
        .text()
        .await
        .map_err(|e| LLMError::ApiCallFailed(format!("Failed to read {} response: {}", provider, e)))?;

    if !status.is_success() {
        return Err(LLMError::ApiCallFailed(format!(
            "{} API error ({}): {}",
            provider, status, resp_text
        )));
    }

    serde_json::from_str(&resp_text).map_err(|e| {
        LLMError::InvalidResponse(format!("Failed to parse {} response: {}", provider, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_api_key() {
        assert!(require_api_key("abc", "Gemini").is_ok());
        assert!(matches!(
            require_api_key("  ", "Gemini"),
            Err(LLMError::MissingCredential(p)) if p == "Gemini"
        ));
    }
}
