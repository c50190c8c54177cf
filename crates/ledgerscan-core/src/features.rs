//! Two-pass feature engine
//!
//! Pass 1 folds every valid raw record into an immutable snapshot of
//! per-category totals and per-business-area counts. Pass 2 walks the same
//! raw sequence again and materializes one [`ProcessedRecord`] per valid row,
//! reading only from that snapshot.

use crate::amount::parse_amount;
use crate::error::{CoreError, Result};
use crate::policy::{SuspicionPolicy, ThresholdPolicy};
use crate::types::{BusinessAreaFrequency, CategoryAggregate, ProcessedRecord, RawRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Per-activity-code aggregates with finalized averages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryAggregates(BTreeMap<String, CategoryAggregate>);

impl CategoryAggregates {
    fn add(mut self, activity_code: &str, amount: f64) -> Self {
        let entry = self.0.entry(activity_code.to_string()).or_default();
        *entry = entry.add(amount);
        self
    }

    fn finalize(self) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|(code, agg)| (code, agg.finalize()))
                .collect(),
        )
    }

    pub fn get(&self, activity_code: &str) -> Option<&CategoryAggregate> {
        self.0.get(activity_code)
    }

    /// Average for a category; zero when the category was never seen
    pub fn average(&self, activity_code: &str) -> f64 {
        self.get(activity_code).map(|agg| agg.average).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryAggregate)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Output of one feature pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub records: Vec<ProcessedRecord>,
    pub aggregates: CategoryAggregates,
    pub frequencies: BusinessAreaFrequency,
    /// Number of raw rows seen
    pub total_rows: usize,
    /// Raw rows dropped for missing business area or activity code
    pub skipped: usize,
}

impl FeatureSet {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn candidate_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_candidate).count()
    }
}

/// Snapshot built by pass 1
struct Aggregation {
    aggregates: CategoryAggregates,
    frequencies: BusinessAreaFrequency,
    valid: usize,
}

/// Converts raw records into processed records
#[derive(Clone)]
pub struct FeatureEngine {
    policy: Arc<dyn SuspicionPolicy>,
}

impl FeatureEngine {
    /// Create an engine with the default threshold policy
    pub fn new() -> Self {
        Self {
            policy: Arc::new(ThresholdPolicy::default()),
        }
    }

    /// Create an engine with a custom suspicion policy
    pub fn with_policy(policy: impl SuspicionPolicy + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Create an engine sharing an existing policy
    pub fn with_shared_policy(policy: Arc<dyn SuspicionPolicy>) -> Self {
        Self { policy }
    }

    /// Run both passes over `raw`.
    ///
    /// Malformed rows are dropped silently. Fails only when pass 2 disagrees
    /// with pass 1 about which rows are valid.
    pub fn process(&self, raw: &[RawRecord]) -> Result<FeatureSet> {
        let Aggregation {
            aggregates,
            frequencies,
            valid,
        } = Self::aggregate(raw);

        let records: Vec<ProcessedRecord> = raw
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_valid())
            .map(|(id, row)| self.materialize(id, row, &aggregates, &frequencies))
            .collect();

        if records.len() != valid {
            return Err(CoreError::InvariantViolation(format!(
                "pass 1 accepted {} rows but pass 2 produced {}",
                valid,
                records.len()
            )));
        }

        let skipped = raw.len() - records.len();
        debug!(
            total_rows = raw.len(),
            processed = records.len(),
            skipped,
            categories = aggregates.len(),
            "Feature pass complete"
        );

        Ok(FeatureSet {
            records,
            aggregates,
            frequencies,
            total_rows: raw.len(),
            skipped,
        })
    }

    fn aggregate(raw: &[RawRecord]) -> Aggregation {
        let init = Aggregation {
            aggregates: CategoryAggregates::default(),
            frequencies: BusinessAreaFrequency::default(),
            valid: 0,
        };

        let folded = raw
            .iter()
            .filter(|row| row.is_valid())
            .fold(init, |acc, row| Aggregation {
                aggregates: acc
                    .aggregates
                    .add(&row.activity_code, parse_amount(&row.amount)),
                frequencies: acc.frequencies.increment(&row.business_area),
                valid: acc.valid + 1,
            });

        Aggregation {
            aggregates: folded.aggregates.finalize(),
            ..folded
        }
    }

    fn materialize(
        &self,
        id: usize,
        row: &RawRecord,
        aggregates: &CategoryAggregates,
        frequencies: &BusinessAreaFrequency,
    ) -> ProcessedRecord {
        let amount = parse_amount(&row.amount);
        let category_average = aggregates.average(&row.activity_code);
        let deviation_ratio = if category_average != 0.0 {
            amount / category_average
        } else {
            0.0
        };
        let business_area_frequency = frequencies.get(&row.business_area);

        ProcessedRecord {
            id,
            business_area: row.business_area.clone(),
            period: row.period.clone(),
            activity_code: row.activity_code.clone(),
            amount,
            business_area_frequency,
            category_average,
            deviation_ratio,
            is_candidate: self
                .policy
                .is_candidate(deviation_ratio, business_area_frequency),
        }
    }
}

impl Default for FeatureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FeatureEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ba: &str, code: &str, amount: &str) -> RawRecord {
        RawRecord::new(ba, "2024-01", code, amount)
    }

    #[test]
    fn test_two_row_category_average() {
        let raw = vec![row("A", "X", "100"), row("A", "X", "1000")];
        let set = FeatureEngine::new().process(&raw).unwrap();

        assert_eq!(set.aggregates.average("X"), 550.0);
        let second = &set.records[1];
        assert!((second.deviation_ratio - 1000.0 / 550.0).abs() < 1e-12);
        assert_eq!(second.business_area_frequency, 2);
        assert!(!second.is_candidate);
    }

    #[test]
    fn test_ids_keep_gaps_for_skipped_rows() {
        let raw = vec![
            row("A", "X", "10"),
            row("", "X", "10"),
            row("A", "", "10"),
            row("B", "Y", "20"),
        ];
        let set = FeatureEngine::new().process(&raw).unwrap();

        let ids: Vec<usize> = set.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 3]);
        assert_eq!(set.skipped, 2);
        assert_eq!(set.total_rows, 4);
    }

    #[test]
    fn test_skipped_rows_do_not_contribute_to_aggregates() {
        let raw = vec![row("A", "X", "10"), row("", "X", "1,000,000")];
        let set = FeatureEngine::new().process(&raw).unwrap();

        let agg = set.aggregates.get("X").unwrap();
        assert_eq!(agg.count, 1);
        assert_eq!(agg.total_amount, 10.0);
        assert_eq!(set.frequencies.get(""), 0);
    }

    #[test]
    fn test_zero_average_gives_zero_deviation() {
        let raw = vec![row("A", "X", "0"), row("A", "X", "abc")];
        let set = FeatureEngine::new().process(&raw).unwrap();

        for record in &set.records {
            assert_eq!(record.category_average, 0.0);
            assert_eq!(record.deviation_ratio, 0.0);
            assert!(!record.is_candidate);
        }
    }

    #[test]
    fn test_negative_amounts_cancelling_to_zero_average() {
        let raw = vec![row("A", "X", "50"), row("A", "X", "-50")];
        let set = FeatureEngine::new().process(&raw).unwrap();

        assert_eq!(set.aggregates.average("X"), 0.0);
        assert!(set.records.iter().all(|r| r.deviation_ratio == 0.0));
    }

    #[test]
    fn test_high_deviation_flags_candidate() {
        let mut raw: Vec<RawRecord> = (0..9).map(|_| row("A", "X", "100")).collect();
        raw.push(row("A", "X", "10,000"));
        let set = FeatureEngine::new().process(&raw).unwrap();

        // average = (900 + 10000) / 10 = 1090
        let outlier = set.records.last().unwrap();
        assert!(outlier.deviation_ratio > 3.0);
        assert!(outlier.is_candidate);
        assert_eq!(set.candidate_count(), 1);
    }

    #[test]
    fn test_empty_input() {
        let set = FeatureEngine::new().process(&[]).unwrap();
        assert!(set.is_empty());
        assert!(set.aggregates.is_empty());
        assert_eq!(set.skipped, 0);
    }

    #[test]
    fn test_custom_policy_is_used() {
        let engine = FeatureEngine::with_policy(|_: f64, _: u64| true);
        let set = engine.process(&[row("A", "X", "1")]).unwrap();
        assert!(set.records[0].is_candidate);
    }

    #[test]
    fn test_processing_is_idempotent() {
        let raw = vec![
            row("A", "X", "1,234.5"),
            row("B", "X", "99"),
            row("", "Y", "5"),
            row("A", "Y", "7"),
        ];
        let engine = FeatureEngine::new();
        let first = engine.process(&raw).unwrap();
        let second = engine.process(&raw).unwrap();

        assert_eq!(first, second);
        for (a, b) in first.records.iter().zip(&second.records) {
            assert_eq!(a.deviation_ratio.to_bits(), b.deviation_ratio.to_bits());
        }
    }
}
