//! Startup orchestration.
//!
//! # Order
//! - Metrics exporter (when enabled)
//! - Registry client and gateway service
//! - Listener bind, then serve until a stop signal
//!
//! Any startup error is fatal.

use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::gateway::GatewayService;
use crate::http::HttpServer;
use crate::lifecycle::signals::Shutdown;
use crate::observability::metrics;
use crate::registry::{RegistryClient, RegistryError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("registry client: {0}")]
    Registry(#[from] RegistryError),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Build every subsystem from `config` and serve until shutdown.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        registry = ?config.registry,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = RegistryClient::new(&config.registry)?;
    let service = GatewayService::new(Arc::new(registry));
    let server = HttpServer::new(&config, service);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, server_shutdown).await?;
    Ok(())
}
