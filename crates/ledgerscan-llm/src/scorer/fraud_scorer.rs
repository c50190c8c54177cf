//! Fraud scoring of candidate records through an LLM

use crate::client::{LLMClient, LLMRequest};
use crate::error::Result;
use crate::scorer::json_extractor::extract_score_results;
use crate::scorer::prompt_templates::{FRAUD_SCORING_PROMPT, SYSTEM_MESSAGE};
use ledgerscan_core::{ProcessedRecord, ScoreResult};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for fraud scoring
#[derive(Debug, Clone)]
pub struct FraudScorerConfig {
    /// Model to use (e.g., "gemini-1.5-flash", "gpt-4o-mini")
    pub model: String,
    /// Maximum tokens for response
    pub max_tokens: Option<u32>,
    /// Temperature (0.0 - 1.0)
    pub temperature: Option<f32>,
}

impl Default for FraudScorerConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            max_tokens: Some(4096),
            temperature: Some(0.2),
        }
    }
}

impl FraudScorerConfig {
    /// Create a new configuration with a specific model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Candidate as sent to the model
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePayload<'a> {
    id: usize,
    business_area: &'a str,
    activity_code: &'a str,
    amount: f64,
    category_average_amount: f64,
    deviation_ratio: f64,
}

impl<'a> From<&'a ProcessedRecord> for CandidatePayload<'a> {
    fn from(record: &'a ProcessedRecord) -> Self {
        Self {
            id: record.id,
            business_area: &record.business_area,
            activity_code: &record.activity_code,
            amount: record.amount,
            category_average_amount: record.category_average,
            deviation_ratio: record.deviation_ratio,
        }
    }
}

/// Scores candidate records with an LLM
pub struct FraudScorer {
    client: Arc<dyn LLMClient>,
    config: FraudScorerConfig,
}

impl FraudScorer {
    /// Create a new fraud scorer
    pub fn new(client: Arc<dyn LLMClient>, config: FraudScorerConfig) -> Self {
        Self { client, config }
    }

    /// Create with default configuration
    pub fn with_defaults(client: Arc<dyn LLMClient>) -> Self {
        Self::new(client, FraudScorerConfig::default())
    }

    /// Name of the underlying client
    pub fn provider(&self) -> &str {
        self.client.name()
    }

    pub fn config(&self) -> &FraudScorerConfig {
        &self.config
    }

    /// Score the given candidates.
    ///
    /// Returns a sparse set of results: only ids that were submitted, each at
    /// most once. An unreadable answer counts as "no confirmed risks". A
    /// failed call is returned as an error.
    pub async fn score(&self, candidates: &[ProcessedRecord]) -> Result<Vec<ScoreResult>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let request = self.build_request(candidates)?;
        debug!(
            provider = self.client.name(),
            model = %request.model,
            candidates = candidates.len(),
            "Submitting candidates for fraud scoring"
        );

        let response = self.client.call(request).await?;
        let parsed = extract_score_results(&response.content);
        let parsed_len = parsed.len();

        let submitted: HashSet<usize> = candidates.iter().map(|c| c.id).collect();
        let mut seen = HashSet::with_capacity(parsed_len);
        let results: Vec<ScoreResult> = parsed
            .into_iter()
            .filter(|r| submitted.contains(&r.id) && seen.insert(r.id))
            .collect();

        if results.len() < parsed_len {
            warn!(
                dropped = parsed_len - results.len(),
                "Ignored scores for unknown or repeated ids"
            );
        }
        info!(
            provider = self.client.name(),
            submitted = candidates.len(),
            scored = results.len(),
            tokens = response.tokens_used,
            "Fraud scoring finished"
        );

        Ok(results)
    }

    fn build_request(&self, candidates: &[ProcessedRecord]) -> Result<LLMRequest> {
        let payload: Vec<CandidatePayload<'_>> = candidates.iter().map(Into::into).collect();
        let candidates_json = serde_json::to_string_pretty(&payload)?;
        let prompt = FRAUD_SCORING_PROMPT.replace("{candidates}", &candidates_json);

        let mut request = LLMRequest::new(prompt, self.config.model.clone())
            .with_system(SYSTEM_MESSAGE.to_string())
            .with_json_output();
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        Ok(request)
    }
}
