//! Request and response payloads

use ledgerscan_sdk::{
    AnalyzeOutcome, Analyzer, FinalRecord, PersistOutcome, ProcessedRecord, SessionSnapshot,
};
use serde::{Deserialize, Serialize};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `GET /v1/records` query
#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    /// Only records flagged as candidates
    #[serde(default)]
    pub candidates_only: bool,
}

/// Processed records
#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub count: usize,
    pub records: Vec<ProcessedRecord>,
}

/// Result of `POST /v1/analyze`
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// `nothing_suspicious`, `scored` or `superseded`
    pub outcome: &'static str,
    pub count: usize,
    pub results: Vec<FinalRecord>,
    pub session: SessionSnapshot,
}

impl AnalyzeResponse {
    /// Build from an outcome; `current` is used when the outcome carries no records
    pub fn new(outcome: AnalyzeOutcome, current: Vec<FinalRecord>, session: SessionSnapshot) -> Self {
        let (outcome, results) = match outcome {
            AnalyzeOutcome::Scored { results } => ("scored", results),
            AnalyzeOutcome::NothingSuspicious => ("nothing_suspicious", Vec::new()),
            AnalyzeOutcome::Superseded => ("superseded", current),
        };
        Self {
            outcome,
            count: results.len(),
            results,
            session,
        }
    }
}

/// Merged final records
#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub count: usize,
    pub results: Vec<FinalRecord>,
}

/// Result of `POST /v1/persist`
#[derive(Debug, Serialize)]
pub struct PersistResponse {
    /// `nothing_to_persist`, `saved` or `superseded`
    pub outcome: &'static str,
    pub saved: usize,
}

impl From<PersistOutcome> for PersistResponse {
    fn from(outcome: PersistOutcome) -> Self {
        match outcome {
            PersistOutcome::NothingToPersist => Self {
                outcome: "nothing_to_persist",
                saved: 0,
            },
            PersistOutcome::Saved { count } => Self {
                outcome: "saved",
                saved: count,
            },
            PersistOutcome::Superseded => Self {
                outcome: "superseded",
                saved: 0,
            },
        }
    }
}
