pub mod config;
pub mod logging;
pub mod server;
pub mod transport;

use anyhow::{Context, Result};
use config::{Config, Transport};
use ga4_mcp_core::AnalyticsAdapter;
use ga4_mcp_providers::{ClientFactory, DataApiClientFactory};
use ga4_mcp_tools::analytics_tools;
use server::McpServer;
use std::sync::Arc;

/// Starts the adapter, serves until the transport stops, then shuts down.
pub async fn run(config: Config) -> Result<()> {
    tracing::info!(
        "Starting {} {} (transport: {:?}, workers: {})",
        server::SERVER_NAME,
        env!("CARGO_PKG_VERSION"),
        config.transport,
        config.workers
    );
    match &config.property_id {
        Some(id) => tracing::info!("Default property: {}", id),
        None => tracing::warn!("No default property configured; calls must pass property_id"),
    }

    let factory: Arc<dyn ClientFactory> =
        Arc::new(DataApiClientFactory::new(config.api_base_url.clone()));
    let adapter = Arc::new(
        AnalyticsAdapter::with_workers(factory, config.property_id.clone(), config.workers)
            .context("Failed to start worker pool")?,
    );

    // Per-call tokens may still work when ambient credentials do not.
    if let Err(e) = adapter.verify_ambient_auth().await {
        tracing::warn!("Continuing without verified ambient credentials: {}", e);
    }

    let server = Arc::new(McpServer::new(analytics_tools(adapter.clone())));
    let served = match config.transport {
        Transport::Stdio => transport::serve_stdio(server).await,
        Transport::StreamableHttp => transport::serve_http(server, &config.bind_address()).await,
    };

    tracing::info!("Shutting down");
    adapter.close().await;
    served
}
