//! IDRAK Server
//!
//! Facility dashboard shell served over WebSocket.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use idrak::catalog::CatalogLoader;
use idrak::config::{IdrakConfig, Overrides};
use idrak::server::{AppState, create_router};
use idrak::storage::{FileBackend, Store, StoreWatcher};

/// IDRAK Facility Dashboard Server
#[derive(Parser, Debug)]
#[command(name = "idrak")]
#[command(about = "IDRAK facility dashboard shell server", long_about = None)]
struct Args {
    /// Path to the config file (default: ./idrak.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host address
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(long)]
    port: Option<u16>,

    /// Path to the persisted store file
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Facility seed file replacing the built-in catalog
    #[arg(long)]
    facility: Option<PathBuf>,

    /// Don't watch the store file for external writes
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("idrak=info,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line arguments
    let args = Args::parse();

    info!("Starting IDRAK server v{}", env!("CARGO_PKG_VERSION"));

    let config = IdrakConfig::load(args.config.as_deref())?.with_overrides(Overrides {
        host: args.host,
        port: args.port,
        storage: args.storage,
        facility: args.facility,
    });

    // Facility catalog
    let catalog = match &config.facility.data {
        Some(path) => CatalogLoader::load(path).await?,
        None => CatalogLoader::builtin()?,
    };
    if catalog.get_floor(&config.facility.default_floor).is_none() {
        error!(
            "Default floor {} is not in the facility catalog",
            config.facility.default_floor
        );
    }

    // Persisted store
    let store = Store::open(FileBackend::new(&config.storage.path))
        .await
        .with_context(|| format!("Failed to open store {}", config.storage.path.display()))?;

    if config.storage.watch && !args.no_watch {
        match StoreWatcher::new(store.clone()) {
            Ok(watcher) => {
                tokio::spawn(watcher.run());
                info!("Store watcher started");
            }
            Err(e) => {
                error!("Failed to start store watcher: {}", e);
            }
        }
    }

    // Create application state and router
    let state = AppState::new(catalog, store, config.session_config());
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down...");
        },
    }
}
