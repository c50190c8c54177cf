//! REST result store
//!
//! Writes flagged rows to a PostgREST-compatible endpoint (Supabase and
//! friends) with a single bulk insert:
//!
//! ```text
//! POST {base_url}/rest/v1/{table}
//! apikey: {api_key}
//! Authorization: Bearer {api_key}
//! Prefer: return=minimal
//!
//! [{"business_area": "...", "fraud_score": 0.8, ..., "is_flagged": true}, ...]
//! ```
//!
//! Any non-2xx status fails the whole batch.

use async_trait::async_trait;
use ledgerscan_core::FinalRecord;
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::flagged_rows;
use crate::traits::ResultStore;

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Stores results through a REST endpoint
pub struct RestResultStore {
    /// HTTP client for making requests
    client: Client,

    /// Full insert URL, `{base_url}/rest/v1/{table}`
    endpoint: String,

    /// API key sent both as `apikey` and as Bearer token
    api_key: String,
}

impl RestResultStore {
    /// Create a store with the default timeout
    ///
    /// # Errors
    ///
    /// Returns `MissingConfiguration` if the URL or key is empty, or
    /// `ApiError` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        table: impl Into<String>,
    ) -> RepositoryResult<Self> {
        Self::with_timeout(
            base_url,
            api_key,
            table,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a store with a custom request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        table: impl Into<String>,
        timeout: Duration,
    ) -> RepositoryResult<Self> {
        let base_url = base_url.into();
        let api_key = api_key.into();
        let table = table.into();

        if base_url.trim().is_empty() {
            return Err(RepositoryError::MissingConfiguration(
                "persistence endpoint URL is not set".to_string(),
            ));
        }
        if api_key.trim().is_empty() {
            return Err(RepositoryError::MissingConfiguration(
                "persistence API key is not set".to_string(),
            ));
        }
        if table.trim().is_empty() {
            return Err(RepositoryError::MissingConfiguration(
                "persistence table is not set".to_string(),
            ));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            RepositoryError::ApiError(format!("Failed to create HTTP client: {}", e))
        })?;

        let endpoint = format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table);

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Insert URL used by this store
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ResultStore for RestResultStore {
    async fn save_flagged(&self, records: &[FinalRecord]) -> RepositoryResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let rows = flagged_rows(records);
        let body = serde_json::to_vec(&rows)?;
        debug!(endpoint = %self.endpoint, rows = rows.len(), bytes = body.len(), "Inserting flagged rows");

        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                RepositoryError::ApiError(format!("Failed to reach {}: {}", self.endpoint, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::ApiError(format!(
                "API returned error status {}: {}",
                status, body
            )));
        }

        info!(rows = rows.len(), "Flagged rows stored");
        Ok(rows.len())
    }

    fn name(&self) -> &str {
        "rest"
    }
}
