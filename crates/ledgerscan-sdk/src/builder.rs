//! Builder pattern for Analyzer

use crate::analyzer::{Analyzer, AnalyzerInner, Collaborator};
use crate::config::{EngineConfig, LLMConfig};
use ledgerscan_core::{FeatureEngine, SuspicionPolicy, ThresholdPolicy};
use ledgerscan_llm::{FraudScorer, LLMClient};
use ledgerscan_repository::{ResultStore, StoreConfig};
use std::sync::Arc;
use tracing::{info, warn};

/// Builder for Analyzer
///
/// Collaborators that cannot be built (a missing API key, a store without
/// URL) do not fail the build; the affected stage reports `NotConfigured`
/// when it is invoked, so uploads keep working.
///
/// # Example
///
/// ```rust,ignore
/// use ledgerscan_sdk::{AnalyzerBuilder, LLMConfig, LLMProvider, StoreConfig};
///
/// let analyzer = AnalyzerBuilder::new()
///     .with_llm(LLMConfig::new(LLMProvider::Gemini).with_api_key(key))
///     .with_store_config(StoreConfig::api(url).with_api_key(store_key))
///     .build();
///
/// // Manual collaborators (for testing)
/// let analyzer = AnalyzerBuilder::new()
///     .with_llm_client(Arc::new(MockProvider::new()))
///     .with_store(Arc::new(MemoryResultStore::new()))
///     .build();
/// ```
pub struct AnalyzerBuilder {
    config: EngineConfig,
    policy: Option<Arc<dyn SuspicionPolicy>>,
    llm_client: Option<Arc<dyn LLMClient>>,
    scorer: Option<FraudScorer>,
    store: Option<Arc<dyn ResultStore>>,
}

impl AnalyzerBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
            policy: None,
            llm_client: None,
            scorer: None,
            store: None,
        }
    }

    /// Start from a full configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the candidate thresholds
    pub fn with_thresholds(mut self, policy: ThresholdPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Use a custom suspicion policy instead of the thresholds
    pub fn with_policy(mut self, policy: impl SuspicionPolicy + 'static) -> Self {
        self.policy = Some(Arc::new(policy));
        self
    }

    /// Set the maximum number of candidates sent to the scorer
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.config.candidate_limit = limit;
        self
    }

    /// Set LLM configuration
    pub fn with_llm(mut self, llm: LLMConfig) -> Self {
        self.config.llm = Some(llm);
        self
    }

    /// Use an already built LLM client; model and sampling come from the LLM configuration
    pub fn with_llm_client(mut self, client: Arc<dyn LLMClient>) -> Self {
        self.llm_client = Some(client);
        self
    }

    /// Use an already built scorer
    pub fn with_scorer(mut self, scorer: FraudScorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Set store configuration
    pub fn with_store_config(mut self, store: StoreConfig) -> Self {
        self.config.store = Some(store);
        self
    }

    /// Use an already built store
    pub fn with_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the analyzer
    pub fn build(self) -> Analyzer {
        let engine = match self.policy {
            Some(policy) => FeatureEngine::with_shared_policy(policy),
            None => FeatureEngine::with_policy(self.config.policy),
        };

        let llm = self.config.llm.clone().unwrap_or_default();
        let scorer = match (self.scorer, self.llm_client, &self.config.llm) {
            (Some(scorer), _, _) => Collaborator::Ready(Arc::new(scorer)),
            (None, Some(client), _) => {
                Collaborator::Ready(Arc::new(FraudScorer::new(client, llm.scorer_config())))
            }
            (None, None, Some(config)) => match config.build_scorer() {
                Ok(scorer) => Collaborator::Ready(Arc::new(scorer)),
                Err(err) => {
                    warn!(error = %err, "Fraud scorer unavailable");
                    Collaborator::Unavailable(err.to_string())
                }
            },
            (None, None, None) => {
                Collaborator::Unavailable("no fraud scorer is configured".to_string())
            }
        };

        let store = match (self.store, &self.config.store) {
            (Some(store), _) => Collaborator::Ready(store),
            (None, Some(config)) => match config.build() {
                Ok(store) => Collaborator::Ready(store),
                Err(err) => {
                    warn!(error = %err, "Result store unavailable");
                    Collaborator::Unavailable(err.to_string())
                }
            },
            (None, None) => Collaborator::Unavailable("no result store is configured".to_string()),
        };

        info!(
            candidate_limit = self.config.candidate_limit,
            scorer_ready = matches!(scorer, Collaborator::Ready(_)),
            store_ready = matches!(store, Collaborator::Ready(_)),
            "Analyzer built"
        );

        Analyzer::from_inner(AnalyzerInner::new(
            engine,
            self.config.candidate_limit,
            scorer,
            store,
        ))
    }
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
