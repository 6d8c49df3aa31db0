//! Log Analytics Server - Binary Entry Point

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use log_analytics::api::{create_router, AppState};
use log_analytics::config::ServerConfig;
use log_analytics::generator::{seed, spawn_generator};
use log_analytics::logging;
use log_analytics::store::{JsonlLogStore, LogStore, MemoryLogStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = ServerConfig::from_env();

    let store: Arc<dyn LogStore> = match &config.data_file {
        Some(path) => Arc::new(
            JsonlLogStore::open(path)
                .with_context(|| format!("opening log file {}", path.display()))?,
        ),
        None => {
            info!("no data file configured, keeping logs in memory");
            Arc::new(MemoryLogStore::new())
        }
    };

    let state = Arc::new(AppState::with_config(store.clone(), &config));

    if config.seed_demo && store.is_empty()? {
        seed(&state.ingest)?;
    }

    let generator = config
        .generator_interval
        .map(|interval| spawn_generator(state.ingest.clone(), interval));

    let app = create_router(state);
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {}", address))?;

    info!(%address, version = log_analytics::VERSION, "log analytics server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = generator {
        handle.abort();
    }
    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
