//! Store configuration types
//!
//! Selects and builds the persistence backend for flagged results.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{RepositoryError, RepositoryResult};
use crate::memory::MemoryResultStore;
use crate::traits::ResultStore;

/// Default destination table
pub const DEFAULT_TABLE: &str = "flagged_transactions";

/// Store source type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreSource {
    /// Keep results in process memory; only used when asked for explicitly
    Memory,
    /// Send results to a REST endpoint
    #[default]
    Api,
}

/// Store configuration
///
/// # Examples
///
/// ```rust
/// use ledgerscan_repository::StoreConfig;
///
/// // REST endpoint
/// let config = StoreConfig::api("https://project.supabase.co").with_api_key("service-key");
///
/// // In-memory, opt-in only (for testing)
/// let config = StoreConfig::memory();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to use
    pub source: StoreSource,

    /// Endpoint base URL (required for Api source)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// API key (required for Api source)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Destination table
    pub table: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            source: StoreSource::Api,
            url: None,
            api_key: None,
            table: DEFAULT_TABLE.to_string(),
            timeout_secs: 30,
        }
    }
}

impl StoreConfig {
    /// In-memory store configuration
    pub fn memory() -> Self {
        Self {
            source: StoreSource::Memory,
            ..Self::default()
        }
    }

    /// REST store configuration
    pub fn api(url: impl Into<String>) -> Self {
        Self {
            source: StoreSource::Api,
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the destination table
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Build the configured store
    ///
    /// # Errors
    ///
    /// `MissingConfiguration` when the Api source (the default) lacks a URL
    /// or key, or when the crate was built without the `api` feature.
    pub fn build(&self) -> RepositoryResult<Arc<dyn ResultStore>> {
        match self.source {
            StoreSource::Memory => Ok(Arc::new(MemoryResultStore::new())),
            StoreSource::Api => self.build_api(),
        }
    }

    #[cfg(feature = "api")]
    fn build_api(&self) -> RepositoryResult<Arc<dyn ResultStore>> {
        let url = non_empty(self.url.as_deref()).ok_or_else(|| {
            RepositoryError::MissingConfiguration(
                "persistence endpoint URL is not set (SUPABASE_URL)".to_string(),
            )
        })?;
        let api_key = non_empty(self.api_key.as_deref()).ok_or_else(|| {
            RepositoryError::MissingConfiguration(
                "persistence API key is not set (SUPABASE_KEY)".to_string(),
            )
        })?;

        let store = crate::api::RestResultStore::with_timeout(
            url,
            api_key,
            self.table.clone(),
            std::time::Duration::from_secs(self.timeout_secs),
        )?;
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "api"))]
    fn build_api(&self) -> RepositoryResult<Arc<dyn ResultStore>> {
        Err(RepositoryError::MissingConfiguration(
            "REST store support is not compiled in (enable the `api` feature)".to_string(),
        ))
    }
}

#[cfg(feature = "api")]
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
