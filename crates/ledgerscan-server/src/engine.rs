//! Analyzer initialization from server configuration

use crate::config::ServerConfig;
use ledgerscan_repository::StoreSource;
use ledgerscan_sdk::{Analyzer, AnalyzerBuilder};
use tracing::{info, warn};

/// Build the analyzer described by the configuration.
///
/// Missing credentials do not stop the server; the affected endpoint
/// answers 503 until the configuration is fixed.
pub fn init_analyzer(config: &ServerConfig) -> Analyzer {
    info!(
        provider = ?config.llm.provider,
        model = %config.llm.model(),
        store = ?config.store.source,
        "Initializing analyzer"
    );

    let analyzer = AnalyzerBuilder::new()
        .with_config(config.engine_config())
        .build();

    if config.store.source == StoreSource::Api
        && config.store.url.as_deref().map_or(true, |url| url.trim().is_empty())
    {
        warn!("No result store endpoint configured (SUPABASE_URL); /v1/persist will answer 503");
    }
    if config.llm.api_key.is_none() && config.llm.provider.key_variable().is_some() {
        warn!(
            variable = config.llm.provider.key_variable().unwrap_or_default(),
            "No scorer API key configured; /v1/analyze will answer 503"
        );
    }

    analyzer
}
