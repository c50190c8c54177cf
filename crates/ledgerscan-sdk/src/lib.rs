//! LedgerScan SDK
//!
//! High-level API over the pipeline: upload a CSV, compute features,
//! score the top candidates with an LLM, merge, and persist.

pub mod analyzer;
pub mod builder;
pub mod config;
pub mod error;
pub mod stage;
pub mod summary;

// Re-export main types
pub use analyzer::{AnalyzeOutcome, Analyzer, PersistOutcome, SessionSnapshot};
pub use builder::AnalyzerBuilder;
pub use config::{EngineConfig, LLMConfig, LLMProvider};
pub use error::{Result, SdkError};
pub use stage::{StageState, StageTracker};
pub use summary::{AnalysisSummary, CategorySummary};

// Re-export commonly used types from dependencies
pub use ledgerscan_core::{FinalRecord, ProcessedRecord, ScoreResult, ThresholdPolicy};
pub use ledgerscan_repository::{StoreConfig, StoreSource};
