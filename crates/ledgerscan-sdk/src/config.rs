//! Configuration types for the Analyzer

use ledgerscan_core::{ThresholdPolicy, DEFAULT_CANDIDATE_LIMIT};
use ledgerscan_llm::{
    FraudScorer, FraudScorerConfig, GeminiProvider, InMemoryLLMCache, LLMClient, MockProvider,
    OpenAIProvider,
};
use ledgerscan_repository::StoreConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SdkError};

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Candidate thresholds
    pub policy: ThresholdPolicy,

    /// Maximum number of candidates sent to the scorer
    pub candidate_limit: usize,

    /// LLM configuration
    pub llm: Option<LLMConfig>,

    /// Result store configuration
    pub store: Option<StoreConfig>,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            policy: ThresholdPolicy::default(),
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            llm: None,
            store: None,
        }
    }

    /// Set candidate thresholds
    pub fn with_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the candidate limit
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit;
        self
    }

    /// Set LLM configuration
    pub fn with_llm(mut self, llm: LLMConfig) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Set store configuration
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = Some(store);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// LLM provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    #[default]
    Gemini,
    OpenAI,
    Mock,
}

impl LLMProvider {
    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            LLMProvider::Gemini => "gemini-1.5-flash",
            LLMProvider::OpenAI => "gpt-4o-mini",
            LLMProvider::Mock => "mock",
        }
    }

    /// Environment variable conventionally holding the key
    pub fn key_variable(&self) -> Option<&'static str> {
        match self {
            LLMProvider::Gemini => Some("GEMINI_API_KEY"),
            LLMProvider::OpenAI => Some("OPENAI_API_KEY"),
            LLMProvider::Mock => None,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM provider (gemini, openai, mock)
    pub provider: LLMProvider,

    /// Model; provider default when unset
    pub model: Option<String>,

    /// API key
    pub api_key: Option<String>,

    /// Override for the provider base URL
    pub base_url: Option<String>,

    pub temperature: Option<f32>,

    pub max_tokens: Option<u32>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Enable response caching
    pub enable_cache: bool,
}

impl LLMConfig {
    pub fn new(provider: LLMProvider) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    /// Set API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Model actually used
    pub fn model(&self) -> String {
        self.model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    /// Scorer settings derived from this configuration
    pub fn scorer_config(&self) -> FraudScorerConfig {
        let mut config = FraudScorerConfig::new(self.model());
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        config
    }

    /// Build the provider client.
    ///
    /// A missing key is reported as `NotConfigured`, naming the variable to set.
    pub fn build_client(&self) -> Result<Arc<dyn LLMClient>> {
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty());

        let client: Arc<dyn LLMClient> = match self.provider {
            LLMProvider::Mock => Arc::new(MockProvider::new()),
            LLMProvider::Gemini => {
                let key = api_key.ok_or_else(|| self.missing_key())?;
                let mut provider = match &self.base_url {
                    Some(url) => GeminiProvider::with_base_url(key, url.clone()),
                    None => GeminiProvider::new(key),
                };
                if let Some(secs) = self.timeout_secs {
                    provider = provider.with_timeout(Duration::from_secs(secs));
                }
                if self.enable_cache {
                    provider = provider.with_cache(Arc::new(InMemoryLLMCache::new()));
                }
                Arc::new(provider)
            }
            LLMProvider::OpenAI => {
                let key = api_key.ok_or_else(|| self.missing_key())?;
                let mut provider = match &self.base_url {
                    Some(url) => OpenAIProvider::with_base_url(key, url.clone()),
                    None => OpenAIProvider::new(key),
                };
                if let Some(secs) = self.timeout_secs {
                    provider = provider.with_timeout(Duration::from_secs(secs));
                }
                if self.enable_cache {
                    provider = provider.with_cache(Arc::new(InMemoryLLMCache::new()));
                }
                Arc::new(provider)
            }
        };
        Ok(client)
    }

    /// Build the fraud scorer
    pub fn build_scorer(&self) -> Result<FraudScorer> {
        Ok(FraudScorer::new(self.build_client()?, self.scorer_config()))
    }

    fn missing_key(&self) -> SdkError {
        let variable = self.provider.key_variable().unwrap_or("api_key");
        SdkError::NotConfigured(format!(
            "{:?} API key is not configured (set {})",
            self.provider, variable
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::new();
        assert_eq!(config.candidate_limit, 30);
        assert_eq!(config.policy, ThresholdPolicy::default());
        assert!(config.llm.is_none());
        assert!(config.store.is_none());
    }

    #[test]
    fn test_llm_config_deserialize() {
        let llm: LLMConfig =
            serde_json::from_str(r#"{"provider": "openai", "api_key": "sk"}"#).unwrap();
        assert_eq!(llm.provider, LLMProvider::OpenAI);
        assert_eq!(llm.model(), "gpt-4o-mini");
        assert!(!llm.enable_cache);
    }

    #[test]
    fn test_missing_key_names_variable() {
        let err = LLMConfig::new(LLMProvider::Gemini).build_client().err().unwrap();
        assert!(matches!(err, SdkError::NotConfigured(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));

        let err = LLMConfig::new(LLMProvider::OpenAI)
            .with_api_key("   ")
            .build_client()
            .err()
            .unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_mock_needs_no_key() {
        let scorer = LLMConfig::new(LLMProvider::Mock).build_scorer().unwrap();
        assert_eq!(scorer.provider(), "mock");
        assert_eq!(scorer.config().model, "mock");
    }
}
