//! In-memory result store

use async_trait::async_trait;
use ledgerscan_core::FinalRecord;
use tokio::sync::Mutex;

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{flagged_rows, FlaggedRow};
use crate::traits::ResultStore;

/// Keeps every saved batch in memory. Used for dry runs and tests.
#[derive(Default)]
pub struct MemoryResultStore {
    batches: Mutex<Vec<Vec<FlaggedRow>>>,
    failure: Option<String>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every save fails with `ApiError(message)`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    /// All batches saved so far, oldest first
    pub async fn batches(&self) -> Vec<Vec<FlaggedRow>> {
        self.batches.lock().await.clone()
    }

    /// Total number of stored rows
    pub async fn row_count(&self) -> usize {
        self.batches.lock().await.iter().map(Vec::len).sum()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn save_flagged(&self, records: &[FinalRecord]) -> RepositoryResult<usize> {
        if let Some(message) = &self.failure {
            return Err(RepositoryError::ApiError(message.clone()));
        }

        let rows = flagged_rows(records);
        let count = rows.len();
        if count > 0 {
            self.batches.lock().await.push(rows);
        }
        Ok(count)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerscan_core::{ProcessedRecord, ScoreResult};

    fn final_record(id: usize) -> FinalRecord {
        let record = ProcessedRecord {
            id,
            business_area: "A".to_string(),
            period: "P".to_string(),
            activity_code: "X".to_string(),
            amount: 10.0,
            business_area_frequency: 1,
            category_average: 2.0,
            deviation_ratio: 5.0,
            is_candidate: true,
        };
        FinalRecord::new(record, &ScoreResult::new(id, 0.5, "r"))
    }

    #[tokio::test]
    async fn test_memory_store_keeps_batches() {
        let store = MemoryResultStore::new();
        assert_eq!(store.save_flagged(&[final_record(0), final_record(1)]).await.unwrap(), 2);
        assert_eq!(store.save_flagged(&[final_record(2)]).await.unwrap(), 1);
        assert_eq!(store.save_flagged(&[]).await.unwrap(), 0);

        assert_eq!(store.batches().await.len(), 2);
        assert_eq!(store.row_count().await, 3);
    }

    #[tokio::test]
    async fn test_failing_store_stores_nothing() {
        let store = MemoryResultStore::failing("offline");
        assert!(store.save_flagged(&[final_record(0)]).await.is_err());
        assert_eq!(store.row_count().await, 0);
    }
}
