// Main entry point for the dictionary lookup service

use dictionary_lookup::{
    core::Config,
    server::{router, AppState},
    services::{ApiClient, DictionaryGateway, FileStore, KeyValueStore, MemoryStore},
    utils::Metrics,
};

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Arc::new(Config::new().context("Failed to load configuration")?);

    // Initialize logging
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new(format!(
        "dictionary_lookup={},tower_http=warn",
        match config.log_level() {
            tracing::Level::TRACE => "trace",
            tracing::Level::DEBUG => "debug",
            tracing::Level::INFO => "info",
            tracing::Level::WARN => "warn",
            tracing::Level::ERROR => "error",
        }
    ));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    if config.api_key().is_empty() {
        info!("DICTIONARY_API_KEY is not set; lookups will fail upstream until it is");
    }

    let metrics = Metrics::new();

    let file_store = if config.cache_persist() {
        let store = FileStore::open(config.cache_file(), Some(config.cache_save_interval()))
            .await
            .context("Failed to open cache store")?;
        info!("Cache store: {} ({} entries)", store.path().display(), store.len());
        Some(Arc::new(store))
    } else {
        info!("Cache store: in-memory");
        None
    };

    let store: Arc<dyn KeyValueStore> = match file_store {
        Some(ref store) => store.clone(),
        None => Arc::new(MemoryStore::new()),
    };

    let api = Arc::new(ApiClient::new(&config, Some(metrics.clone()))?);
    let gateway = Arc::new(DictionaryGateway::new(api, store, Some(metrics.clone())));

    let app = router(AppState { gateway, metrics });

    let addr = format!("{}:{}", config.server_host(), config.server_port());
    info!("{}", "=".repeat(70));
    info!("Server starting on http://{}", addr);
    info!("Dictionary API: {}", config.api_url());
    info!("{}", "-".repeat(70));
    info!("Endpoints:");
    info!("  GET  /                           - Root endpoint");
    info!("  GET  /health                     - Health check");
    info!("  GET  /languages                  - Source languages");
    info!("  GET  /languages/:from/targets    - Target languages for a source");
    info!("  GET  /lookup?text=&from=&to=     - Dictionary lookup");
    info!("  GET  /metrics                    - Prometheus metrics");
    info!("  GET  /stats                      - Detailed statistics");
    info!("{}", "=".repeat(70));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(store) = file_store {
        info!("Saving cache store before exit");
        store.flush().await.context("Failed to save cache store")?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
