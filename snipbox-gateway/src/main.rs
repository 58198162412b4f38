//! Entry point for the `snipbox-gateway` HTTP server.

use std::net::SocketAddr;

use clap::Parser;
use snipbox_gateway::{create_router, AppState, Cli, GatewayConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let env_file = cli.env_file();
    // Loaded before the subscriber so RUST_LOG may come from the file.
    let env_loaded = dotenvy::from_path(&env_file);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match env_loaded {
        Ok(()) => info!(path = %env_file.display(), "loaded env file"),
        Err(e) => tracing::warn!(
            path = %env_file.display(),
            error = %e,
            "env file not loaded, using process environment"
        ),
    }

    let config = match GatewayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let state = match AppState::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to build denylist");
            std::process::exit(1);
        }
    };

    if let Err(e) = state.orchestrator.prepare().await {
        tracing::error!(error = %e, "failed to prepare staging directory");
        std::process::exit(1);
    }

    let eviction = state.limiter.spawn_eviction();

    let addr = config.listen_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(%addr, mode = ?cli.mode, "snipbox-gateway listening");

    let app = create_router(state);
    let served = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    eviction.shutdown().await;

    if let Err(e) = served {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
    info!("snipbox-gateway stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
