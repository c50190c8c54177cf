//! Persistence trait

use async_trait::async_trait;
use ledgerscan_core::FinalRecord;

use crate::error::RepositoryResult;

/// A destination for flagged results.
///
/// A batch is stored as a unit: either every record is accepted or the call
/// fails and nothing is assumed stored.
///
/// # Example
///
/// ```no_run
/// use ledgerscan_repository::{MemoryResultStore, ResultStore};
///
/// # async fn example(records: Vec<ledgerscan_core::FinalRecord>) -> anyhow::Result<()> {
/// let store = MemoryResultStore::new();
/// let saved = store.save_flagged(&records).await?;
/// println!("stored {} rows in {}", saved, store.name());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Store the given records, returning how many were stored
    async fn save_flagged(&self, records: &[FinalRecord]) -> RepositoryResult<usize>;

    /// Short backend name for logs and error messages
    fn name(&self) -> &str;
}
