//! Realm server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Player client ── ws ──▶ http/websocket ──▶ session manager
//!                                                     ▲
//!     Operator ── /admin ──▶ admin handlers           │ snapshot
//!                              │                      │
//!                              ├─▶ realm announcer ──▶ broadcast dispatcher
//!                              └─▶ countdown ─▶ executor ─▶ exit
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use realm_server::config::{load_config, RealmConfig};
use realm_server::lifecycle::signals;
use realm_server::observability::logging;
use realm_server::RealmServer;

#[derive(Parser)]
#[command(name = "realm-server")]
#[command(about = "Realm server with operator-driven shutdown", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RealmConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        realm = %config.realm.name,
        bind_address = %config.listener.bind_address,
        max_sessions = config.listener.max_sessions,
        grace_secs = config.shutdown.grace_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => realm_server::observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let server = RealmServer::new(config);
    server.run(listener, signals::stop_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
