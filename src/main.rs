//! chain-subconverter
//!
//! Rewrites Clash/Mihomo subscriptions so landing nodes dial out through a
//! front proxy (`dialer-proxy`), either from explicit pairs or by matching
//! node and group names against a region table.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client request
//!     ─────────────▶ http (router, handlers) ──▶ subscription (fetch, decode)
//!                                                        │
//!                                                        ▼
//!                                                 chain engine
//!                                       (classify → resolve → apply)
//!                                                        │
//!     Client response                                    ▼
//!     ◀───────────── http (JSON / text/yaml) ◀── subscription (encode)
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use chain_subconverter::config::{load_config, loader::set_port};
use chain_subconverter::http::HttpServer;
use chain_subconverter::lifecycle::{wait_for_signal, Shutdown};
use chain_subconverter::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "chain-subconverter")]
#[command(about = "Chain proxy subscription converter", long_about = None)]
struct Args {
    /// Path to a TOML config file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener port, overriding config and PORT
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        set_port(&mut config, port);
    }

    logging::init_logging(&config.observability);
    tracing::info!("chain-subconverter v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        fetch_timeout_secs = config.fetch.timeout_secs,
        regions = config.pairing.regions.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(e) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    error = %e,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let receiver = shutdown.subscribe();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
