//! Candidate selection for external scoring

use crate::types::ProcessedRecord;

/// Maximum number of records submitted to the external scorer per run
pub const DEFAULT_CANDIDATE_LIMIT: usize = 30;

/// Pick the flagged records with the highest deviation ratios.
///
/// Returns at most `limit` records, ordered by `deviation_ratio` descending.
/// Equal ratios keep their input order.
pub fn select_candidates(records: &[ProcessedRecord], limit: usize) -> Vec<ProcessedRecord> {
    let mut candidates: Vec<&ProcessedRecord> =
        records.iter().filter(|r| r.is_candidate).collect();

    candidates.sort_by(|a, b| b.deviation_ratio.total_cmp(&a.deviation_ratio));
    candidates.into_iter().take(limit).cloned().collect()
}
