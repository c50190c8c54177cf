//! Wire model for stored results

use ledgerscan_core::FinalRecord;
use serde::{Deserialize, Serialize};

/// One flagged transaction as stored by the persistence backend.
///
/// Field names are the column names of the target table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedRow {
    pub business_area: String,
    pub period: String,
    pub activity_code: String,
    pub amount: f64,
    pub fraud_score: f64,
    pub deviation_ratio: f64,
    pub reason: String,
    /// Always `true`; only flagged records are ever stored
    pub is_flagged: bool,
}

impl From<&FinalRecord> for FlaggedRow {
    fn from(record: &FinalRecord) -> Self {
        Self {
            business_area: record.record.business_area.clone(),
            period: record.record.period.clone(),
            activity_code: record.record.activity_code.clone(),
            amount: record.record.amount,
            fraud_score: record.fraud_score,
            deviation_ratio: record.record.deviation_ratio,
            reason: record.reason.clone(),
            is_flagged: true,
        }
    }
}

/// Convert a batch of final records
pub fn flagged_rows(records: &[FinalRecord]) -> Vec<FlaggedRow> {
    records.iter().map(FlaggedRow::from).collect()
}
