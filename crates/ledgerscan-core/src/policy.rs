//! Suspicion policy
//!
//! Decides whether a processed record becomes a candidate for external
//! scoring. The thresholds are fixed policy values, not derived from data.

use serde::{Deserialize, Serialize};

/// Predicate over already-computed record fields
pub trait SuspicionPolicy: Send + Sync {
    fn is_candidate(&self, deviation_ratio: f64, business_area_frequency: u64) -> bool;
}

/// Threshold rule:
/// `deviation > deviation_threshold`
/// OR `(frequency > high_frequency_threshold AND deviation > elevated_deviation_threshold)`.
///
/// All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdPolicy {
    pub deviation_threshold: f64,
    pub high_frequency_threshold: u64,
    pub elevated_deviation_threshold: f64,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            deviation_threshold: 3.0,
            high_frequency_threshold: 100,
            elevated_deviation_threshold: 2.0,
        }
    }
}

impl SuspicionPolicy for ThresholdPolicy {
    fn is_candidate(&self, deviation_ratio: f64, business_area_frequency: u64) -> bool {
        deviation_ratio > self.deviation_threshold
            || (business_area_frequency > self.high_frequency_threshold
                && deviation_ratio > self.elevated_deviation_threshold)
    }
}

impl<F> SuspicionPolicy for F
where
    F: Fn(f64, u64) -> bool + Send + Sync,
{
    fn is_candidate(&self, deviation_ratio: f64, business_area_frequency: u64) -> bool {
        self(deviation_ratio, business_area_frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_deviation_alone_flags() {
        let policy = ThresholdPolicy::default();
        assert!(policy.is_candidate(3.01, 1));
        assert!(!policy.is_candidate(3.0, 1)); // not greater-than
        assert!(!policy.is_candidate(2.99, 1));
    }

    #[test]
    fn test_frequency_clause() {
        let policy = ThresholdPolicy::default();
        assert!(policy.is_candidate(2.01, 101));
        assert!(!policy.is_candidate(2.0, 101));
        assert!(!policy.is_candidate(2.5, 100));
        assert!(policy.is_candidate(3.0, 150));
    }

    #[test]
    fn test_zero_deviation_never_flags() {
        let policy = ThresholdPolicy::default();
        assert!(!policy.is_candidate(0.0, 10_000));
    }

    #[test]
    fn test_custom_thresholds() {
        let policy = ThresholdPolicy {
            deviation_threshold: 1.5,
            ..Default::default()
        };
        assert!(policy.is_candidate(1.6, 1));
    }

    #[test]
    fn test_closure_policy() {
        let always = |_: f64, _: u64| true;
        assert!(always.is_candidate(0.0, 0));
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: ThresholdPolicy =
            serde_json::from_str(r#"{"deviation_threshold": 4.0}"#).unwrap();
        assert_eq!(policy.deviation_threshold, 4.0);
        assert_eq!(policy.high_frequency_threshold, 100);
        assert_eq!(policy.elevated_deviation_threshold, 2.0);
    }
}
