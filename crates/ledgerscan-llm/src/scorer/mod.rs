//! Fraud scoring on top of an LLM client

pub mod fraud_scorer;
pub mod json_extractor;
pub mod prompt_templates;

pub use fraud_scorer::{FraudScorer, FraudScorerConfig};
pub use json_extractor::extract_score_results;
