//! LedgerScan HTTP Server
//!
//! Upload a transaction CSV, inspect features, score outliers, persist flags.

use anyhow::Result;
use ledgerscan_server::{
    api,
    config::{LogFormat, ServerConfig},
    engine,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so the log format can be chosen
    let config = ServerConfig::load()?;

    init_tracing(config.log_format)?;
    info!(
        host = %config.host,
        port = config.port,
        provider = ?config.llm.provider,
        store = ?config.store.source,
        "Loaded configuration"
    );

    let analyzer = engine::init_analyzer(&config);
    let app = api::create_router_with_limit(analyzer, config.max_upload_bytes);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    info!("  Health check: http://{}/health", addr);
    info!("  Upload CSV:   POST http://{}/v1/uploads", addr);
    info!("  Analyze:      POST http://{}/v1/analyze", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "ledgerscan_server=info,ledgerscan_sdk=info,ledgerscan_llm=info,ledgerscan_repository=info,ledgerscan_core=info,tower_http=debug"
            .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}
