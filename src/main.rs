//! Image delivery service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────────▶ http server ──▶ upload body / upstream fetch
//!                                              │
//!                                              ▼
//!                                     request pool (segment chain)
//!                                              │
//!                                              ▼
//!                          ByteSource ──▶ pipeline ──▶ ByteSink
//!                                                          │
//!                                                          ▼
//!     Client Response                              response finalizer
//!     ◀───────────────── response head + body ◀──── (headers, chain)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use image_proxy::config::{load_config, validate_config, ConfigError, ServiceConfig};
use image_proxy::observability::{logging, metrics};
use image_proxy::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "image-proxy", version, about = "Image delivery service")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        max_body_bytes = config.listener.max_body_bytes,
        pool_max_bytes = config.pool.max_bytes,
        default_max_age_secs = config.cache.default_max_age_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
