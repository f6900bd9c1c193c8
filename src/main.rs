//! Caching mirror proxy binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                 MIRROR-CACHE                   │
//!                    │                                                │
//!   Client Request   │  ┌─────────┐   ┌─────────┐   ┌─────────────┐  │
//!   ─────────────────┼─▶│   net   │──▶│  http   │──▶│    cache    │  │
//!                    │  │listener │   │ parser  │   │ lookup/store│  │
//!                    │  └─────────┘   └─────────┘   └──────┬──────┘  │
//!                    │                                     │ miss    │
//!                    │                                     ▼         │
//!   Client Response  │  ┌─────────┐   ┌─────────┐   ┌─────────────┐  │
//!   ◀────────────────┼──│response │◀──│upstream │◀──│   routing   │◀─┼── Mirror
//!                    │  │ framing │   │ fetcher │   │mirror table │  │   Server
//!                    │  └─────────┘   └─────────┘   └─────────────┘  │
//!                    └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mirror_cache::config::loader::load_config;
use mirror_cache::config::ProxyConfig;
use mirror_cache::lifecycle::Shutdown;
use mirror_cache::net::Listener;
use mirror_cache::ProxyServer;

#[derive(Parser)]
#[command(name = "mirror-cache")]
#[command(about = "Caching HTTP reverse proxy for package-repository mirrors", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mirror_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("mirror-cache v0.1.0 starting");

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        mirrors = config.mirrors.len(),
        cache_root = %config.cache.root.display(),
        "Configuration loaded"
    );

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.trigger();
        }
    });

    let server = ProxyServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
