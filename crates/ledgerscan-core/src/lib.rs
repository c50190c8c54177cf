//! LedgerScan Core - record types and scoring pipeline primitives
//!
//! This crate holds everything that is pure computation:
//! - Record types flowing through the pipeline (raw, processed, scored, final)
//! - CSV row decoding into raw records
//! - The two-pass feature engine computing per-category statistics
//! - The suspicion policy that flags candidates
//! - Candidate selection and result merging
//!
//! Nothing in here performs I/O beyond reading an in-memory byte buffer.

pub mod amount;
pub mod error;
pub mod features;
pub mod ingest;
pub mod merge;
pub mod policy;
pub mod select;
pub mod types;

// Re-export commonly used types
pub use amount::parse_amount;
pub use error::{CoreError, Result};
pub use features::{CategoryAggregates, FeatureEngine, FeatureSet};
pub use ingest::parse_csv;
pub use merge::merge_results;
pub use policy::{SuspicionPolicy, ThresholdPolicy};
pub use select::{select_candidates, DEFAULT_CANDIDATE_LIMIT};
pub use types::{
    BusinessAreaFrequency, CategoryAggregate, FinalRecord, ProcessedRecord, RawRecord,
    ScoreResult,
};
