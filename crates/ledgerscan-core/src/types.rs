//! Record types flowing through the scoring pipeline
//!
//! ```text
//! RawRecord ──(feature engine)──> ProcessedRecord ──(selector)──> candidates
//!                                        │                           │
//!                                        │                     (external scorer)
//!                                        │                           ↓
//!                                        └──────(merge by id)──── ScoreResult
//!                                                     ↓
//!                                                FinalRecord
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One decoded CSV row. All fields are kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub business_area: String,
    pub period: String,
    pub activity_code: String,
    /// Comma-grouped decimal text, e.g. `"1,250.00"`
    pub amount: String,
}

impl RawRecord {
    /// Create a raw record from its four text fields
    pub fn new(
        business_area: impl Into<String>,
        period: impl Into<String>,
        activity_code: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            business_area: business_area.into(),
            period: period.into(),
            activity_code: activity_code.into(),
            amount: amount.into(),
        }
    }

    /// A record without business area or activity code takes no part in scoring
    pub fn is_valid(&self) -> bool {
        !self.business_area.trim().is_empty() && !self.activity_code.trim().is_empty()
    }
}

/// Running totals for one activity code
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAggregate {
    pub total_amount: f64,
    pub count: u64,
    pub average: f64,
}

impl CategoryAggregate {
    pub(crate) fn add(mut self, amount: f64) -> Self {
        self.total_amount += amount;
        self.count += 1;
        self
    }

    /// Fix `average` from the totals. Zero count gives an average of zero.
    pub(crate) fn finalize(mut self) -> Self {
        self.average = if self.count > 0 {
            self.total_amount / self.count as f64
        } else {
            0.0
        };
        self
    }
}

/// Transaction count per business area across a whole upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessAreaFrequency(BTreeMap<String, u64>);

impl BusinessAreaFrequency {
    pub(crate) fn increment(mut self, business_area: &str) -> Self {
        *self.0.entry(business_area.to_string()).or_insert(0) += 1;
        self
    }

    /// Count for a business area, zero if never seen
    pub fn get(&self, business_area: &str) -> u64 {
        self.0.get(business_area).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// A valid raw record enriched with category statistics and the suspicion flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedRecord {
    /// Zero-based position in the original raw sequence
    pub id: usize,
    pub business_area: String,
    pub period: String,
    pub activity_code: String,
    pub amount: f64,
    pub business_area_frequency: u64,
    pub category_average: f64,
    pub deviation_ratio: f64,
    pub is_candidate: bool,
}

/// Score returned by the external scorer for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub id: usize,
    /// Intended to lie in [0, 1]; not clamped
    pub fraud_score: f64,
    #[serde(default)]
    pub reason: String,
}

impl ScoreResult {
    pub fn new(id: usize, fraud_score: f64, reason: impl Into<String>) -> Self {
        Self {
            id,
            fraud_score,
            reason: reason.into(),
        }
    }
}

/// A processed record joined with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalRecord {
    #[serde(flatten)]
    pub record: ProcessedRecord,
    pub fraud_score: f64,
    pub reason: String,
}

impl FinalRecord {
    pub fn new(record: ProcessedRecord, score: &ScoreResult) -> Self {
        Self {
            record,
            fraud_score: score.fraud_score,
            reason: score.reason.clone(),
        }
    }

    pub fn id(&self) -> usize {
        self.record.id
    }
}
