//! Dataset summary for the presentation layer

use ledgerscan_core::FeatureSet;
use serde::Serialize;

/// Number of categories listed in [`AnalysisSummary::top_categories`]
pub const TOP_CATEGORY_COUNT: usize = 5;

/// Totals for one activity code
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub activity_code: String,
    pub total_amount: f64,
    pub count: u64,
    pub average: f64,
}

/// Headline numbers for one uploaded dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_rows: usize,
    pub processed: usize,
    pub skipped: usize,
    pub total_amount: f64,
    pub candidate_count: usize,
    pub category_count: usize,
    pub business_area_count: usize,
    /// Largest categories by total amount, descending
    pub top_categories: Vec<CategorySummary>,
}

impl AnalysisSummary {
    pub fn from_features(features: &FeatureSet) -> Self {
        let mut categories: Vec<CategorySummary> = features
            .aggregates
            .iter()
            .map(|(code, agg)| CategorySummary {
                activity_code: code.to_string(),
                total_amount: agg.total_amount,
                count: agg.count,
                average: agg.average,
            })
            .collect();
        categories.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
        categories.truncate(TOP_CATEGORY_COUNT);

        Self {
            total_rows: features.total_rows,
            processed: features.records.len(),
            skipped: features.skipped,
            total_amount: features.records.iter().map(|r| r.amount).sum(),
            candidate_count: features.candidate_count(),
            category_count: features.aggregates.len(),
            business_area_count: features.frequencies.len(),
            top_categories: categories,
        }
    }
}
