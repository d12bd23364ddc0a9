//! songlib-api - song catalog HTTP service
//!
//! Loads settings from flags / environment / `.env`, connects to PostgreSQL
//! (fatal on failure), and serves the song routes until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use songlib_api::config::{Args, Settings};
use songlib_api::external::HttpSongInfoClient;
use songlib_api::{build_router, AppState, SongCatalog};
use songlib_common::db::{self, PgSongStore};

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads the environment
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();

    let default_filter = match args.log_level.as_deref() {
        Some("debug") => "songlib_api=debug,songlib_common=debug,tower_http=debug",
        _ => "songlib_api=info,songlib_common=info,tower_http=info",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting songlib-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }

    let settings = Settings::from_args(args).context("Invalid configuration")?;
    if settings.external_api.base_url.is_none() {
        warn!("EXTERNAL_API_URL is not set; creating songs will fail until it is configured");
    }

    let pool = db::connect(&settings.db)
        .await
        .context("Failed to connect to database")?;

    let info_client = HttpSongInfoClient::new(&settings.external_api)
        .context("Failed to build metadata HTTP client")?;

    let catalog = SongCatalog::new(Arc::new(PgSongStore::new(pool)), Arc::new(info_client));
    let app = build_router(AppState::new(catalog));

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("songlib-api listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
