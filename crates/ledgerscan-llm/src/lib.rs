//! LedgerScan LLM Integration
//!
//! Provider clients and the external fraud scorer:
//! - `LLMClient` trait with Gemini, OpenAI-compatible and mock providers
//! - Optional in-memory response cache
//! - `FraudScorer`, which turns candidate records into a sparse set of scores
//!
//! Calls take seconds; the scorer is invoked once per analysis run, never per record.

// Re-export core types
pub use cache::{InMemoryLLMCache, LLMCache};
pub use client::{LLMClient, LLMRequest, LLMResponse};
pub use error::{LLMError, Result};

// Re-export providers
pub use provider::{GeminiProvider, LLMProvider, MockProvider, OpenAIProvider};

pub use scorer::{extract_score_results, FraudScorer, FraudScorerConfig};

pub mod cache;
pub mod client;
pub mod error;
pub mod provider;
pub mod scorer;
