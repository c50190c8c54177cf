//! Joining scorer output back onto processed records

use crate::types::{FinalRecord, ProcessedRecord, ScoreResult};
use std::collections::HashMap;

/// Inner-join `records` with `scores` on id and order by fraud score, highest first.
///
/// Records without a score are dropped, as are scores without a record.
/// When the scorer repeats an id, its first result is used. Equal fraud
/// scores keep the order of `records`.
pub fn merge_results(records: &[ProcessedRecord], scores: &[ScoreResult]) -> Vec<FinalRecord> {
    let mut by_id: HashMap<usize, &ScoreResult> = HashMap::with_capacity(scores.len());
    for score in scores {
        by_id.entry(score.id).or_insert(score);
    }

    let mut merged: Vec<FinalRecord> = records
        .iter()
        .filter_map(|record| {
            by_id
                .get(&record.id)
                .map(|score| FinalRecord::new(record.clone(), score))
        })
        .collect();

    merged.sort_by(|a, b| b.fraud_score.total_cmp(&a.fraud_score));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<ProcessedRecord> {
        (0..n)
            .map(|id| ProcessedRecord {
                id,
                business_area: format!("BA{}", id),
                period: "P".to_string(),
                activity_code: "X".to_string(),
                amount: 1.0,
                business_area_frequency: 1,
                category_average: 1.0,
                deviation_ratio: 1.0,
                is_candidate: true,
            })
            .collect()
    }

    #[test]
    fn test_sparse_scores_out_of_order() {
        let scores = vec![
            ScoreResult::new(3, 0.4, "low"),
            ScoreResult::new(7, 0.95, "high"),
        ];
        let merged = merge_results(&records(10), &scores);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id(), 7);
        assert_eq!(merged[0].reason, "high");
        assert_eq!(merged[0].record.business_area, "BA7");
        assert_eq!(merged[1].id(), 3);
    }

    #[test]
    fn test_unknown_ids_are_dropped() {
        let scores = vec![ScoreResult::new(42, 0.9, "ghost"), ScoreResult::new(1, 0.2, "")];
        let merged = merge_results(&records(3), &scores);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id(), 1);
    }

    #[test]
    fn test_duplicate_score_ids_use_first() {
        let scores = vec![ScoreResult::new(0, 0.1, "first"), ScoreResult::new(0, 0.9, "second")];
        let merged = merge_results(&records(1), &scores);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].reason, "first");
    }

    #[test]
    fn test_equal_scores_keep_record_order() {
        let scores = vec![
            ScoreResult::new(4, 0.5, ""),
            ScoreResult::new(1, 0.5, ""),
            ScoreResult::new(2, 0.8, ""),
        ];
        let ids: Vec<usize> = merge_results(&records(5), &scores)
            .iter()
            .map(FinalRecord::id)
            .collect();
        assert_eq!(ids, vec![2, 1, 4]);
    }

    #[test]
    fn test_scores_are_not_clamped() {
        let merged = merge_results(&records(1), &[ScoreResult::new(0, 1.7, "")]);
        assert_eq!(merged[0].fraud_score, 1.7);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge_results(&records(4), &[]).is_empty());
        assert!(merge_results(&[], &[ScoreResult::new(0, 0.5, "")]).is_empty());
    }
}
