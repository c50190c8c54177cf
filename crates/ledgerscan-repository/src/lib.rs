//! Persistence gateway for LedgerScan
//!
//! Flagged results leave the process through a [`ResultStore`]:
//!
//! - **REST store** (`api` feature, on by default): bulk insert into a
//!   PostgREST-compatible table
//! - **Memory store**: keeps batches in memory for dry runs and tests
//!
//! # Quick Start
//!
//! ```no_run
//! use ledgerscan_repository::{ResultStore, StoreConfig};
//!
//! # async fn example(records: Vec<ledgerscan_core::FinalRecord>) -> anyhow::Result<()> {
//! let store = StoreConfig::api("https://project.supabase.co")
//!     .with_api_key("service-key")
//!     .build()?;
//! store.save_flagged(&records).await?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod traits;

#[cfg(feature = "api")]
pub use api::RestResultStore;
pub use config::{StoreConfig, StoreSource, DEFAULT_TABLE};
pub use error::{RepositoryError, RepositoryResult};
pub use memory::MemoryResultStore;
pub use models::FlaggedRow;
pub use traits::ResultStore;
