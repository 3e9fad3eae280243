//! Edge gate server.
//!
//! Serves a single-page application from a public directory and gates
//! non-asset requests behind bot, country and referer checks.
//!
//! # Request Pipeline
//!
//! ```text
//!     Client Request
//!     ─────────────────▶ request id / trace / CORS / gzip / limits
//!                              │
//!                              ▼
//!                       ┌──────────────┐   hit
//!                       │ static asset │─────────▶ file + long cache headers
//!                       └──────┬───────┘
//!                              │ miss
//!                              ▼
//!                       ┌──────────────┐
//!                       │ frame headers│ (applied to everything below)
//!                       └──────┬───────┘
//!                              ▼
//!                       ┌──────────────┐  match
//!                       │ bots │ geo │ origin │──────▶ 403
//!                       └──────┬───────┘
//!                              ▼
//!                 /frontend-loader → {"allowed":true}
//!                 anything else    → index.html
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gate::config::loader::{load_config, PORT_ENV};
use edge_gate::http::HttpServer;
use edge_gate::lifecycle::{signals, Shutdown};
use edge_gate::observability::{logging, metrics};

#[derive(Debug, Parser)]
#[command(name = "edge-gate")]
#[command(about = "Static SPA server with request-level access filters", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "EDGE_GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port, overriding both the file and the PORT variable.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.listener.port = port;
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-gate starting");
    tracing::info!(
        config_file = ?cli.config,
        port_env = ?std::env::var(PORT_ENV).ok(),
        bind_address = %config.listener.bind_address(),
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

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_forwarder(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
