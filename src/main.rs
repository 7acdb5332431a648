//! Zerolight Portal Gateway
//!
//! A zero-trust gate in front of outbound domain traffic, built with Tokio
//! and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  PORTAL GATEWAY                  │
//!                        │                                                  │
//!   GET /go/{domain}     │  ┌─────────┐    ┌──────────────┐    ┌─────────┐  │
//!   ─────────────────────┼─▶│  http   │───▶│   gateway    │───▶│ policy  │  │
//!   POST /admin/recalc   │  │handlers │    │   service    │    │threshold│  │
//!   GET /allowed         │  └─────────┘    └──────┬───────┘    └─────────┘  │
//!                        │                        │                         │
//!                        │                        ▼                         │
//!   302 / 423 / JSON     │                 ┌──────────────┐                 │
//!   ◀────────────────────┼─────────────────│   registry   │◀────────────────┼──── PostgREST
//!                        │                 │    client    │                 │     (domains,
//!                        │                 └──────────────┘                 │      metrics_daily,
//!                        │                                                  │      events,
//!                        │  config · observability · lifecycle              │      decisions)
//!                        └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use portal_gateway::config::load_config;
use portal_gateway::lifecycle::startup;
use portal_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "portal-gateway")]
#[command(about = "Zero-trust gateway for domains and bots", long_about = None)]
struct Args {
    /// Optional TOML config file; registry credentials still come from the environment.
    #[arg(short, long, env = "PORTAL_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            tracing::error!(error = %e, "Refusing to start");
            return Err(e.into());
        }
    };

    init_logging(&config.observability.log_level);
    tracing::info!("portal-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
