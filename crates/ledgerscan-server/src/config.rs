//! Server configuration

use ledgerscan_core::{ThresholdPolicy, DEFAULT_CANDIDATE_LIMIT};
use ledgerscan_repository::{StoreConfig, StoreSource};
use ledgerscan_sdk::{EngineConfig, LLMConfig};
use serde::{Deserialize, Serialize};

/// Default upload size limit (50 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (HTTP)
    pub port: u16,

    /// Largest accepted CSV upload in bytes
    pub max_upload_bytes: usize,

    /// Log output format
    pub log_format: LogFormat,

    /// Candidate thresholds
    pub policy: ThresholdPolicy,

    /// Maximum number of candidates sent to the scorer
    pub candidate_limit: usize,

    /// Fraud scorer settings
    pub llm: LLMConfig,

    /// Result store settings
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_format: LogFormat::Text,
            policy: ThresholdPolicy::default(),
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            llm: LLMConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config/server.*`, the environment and `.env`
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let mut config = Self::load_from("config/server")?;
        config.apply_env_fallbacks(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load from an optional config file (name without extension) plus
    /// `LEDGERSCAN_`-prefixed environment variables
    pub fn load_from(file: &str) -> anyhow::Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix("LEDGERSCAN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to read config: {}", e))?;

        cfg.try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e))
    }

    /// Fill credentials the file left empty from the well-known variables:
    /// the provider key variable, `SUPABASE_URL` and `SUPABASE_KEY`.
    ///
    /// The store stays on the REST backend unless `source = "memory"` is set
    /// explicitly; without a URL it reports a configuration error on persist.
    pub fn apply_env_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if is_blank(&self.llm.api_key) {
            if let Some(variable) = self.llm.provider.key_variable() {
                if let Some(key) = lookup(variable) {
                    self.llm.api_key = Some(key);
                }
            }
        }

        if is_blank(&self.store.url) {
            if let Some(url) = lookup("SUPABASE_URL") {
                self.store.url = Some(url);
            }
        }
        if is_blank(&self.store.api_key) {
            if let Some(key) = lookup("SUPABASE_KEY") {
                self.store.api_key = Some(key);
            }
        }
    }

    /// Analyzer configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new()
            .with_policy(self.policy)
            .with_candidate_limit(self.candidate_limit)
            .with_llm(self.llm.clone())
            .with_store(self.store.clone())
    }

    /// Socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
