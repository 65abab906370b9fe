//! newsroom-server - News aggregation service
//!
//! Serves the public feeds and search, reporter submissions with automatic
//! enrichment, and the admin dashboards over a single SQLite database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use newsroom_common::config::{self, CliOverrides};
use newsroom_common::db::init::init_database;
use newsroom_server::db::sessions;
use newsroom_server::{build_router, AppState};
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for newsroom-server
#[derive(Parser, Debug)]
#[command(name = "newsroom-server")]
#[command(about = "News aggregation service with automatic enrichment")]
#[command(version)]
struct Args {
    /// Data directory holding the database and uploaded media
    #[arg(short, long, env = "NEWSROOM_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "NEWSROOM_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "NEWSROOM_PORT")]
    port: Option<u16>,

    /// Path to newsroom.toml
    #[arg(short, long, env = "NEWSROOM_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so the TOML log level can seed the filter
    let toml_config = config::load_toml_config(args.config.as_deref())
        .context("Failed to load configuration file")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "newsroom_server={level},newsroom_common={level},tower_http=info",
                    level = toml_config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting newsroom-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = CliOverrides {
        root_folder: args.root_folder,
        host: args.host,
        port: args.port,
    };
    let config = config::resolve(&cli, &toml_config).context("Invalid configuration")?;
    info!("Root folder: {}", config.root_folder.display());

    for kind in ["images", "videos"] {
        let dir = config.upload_root().join(kind);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;
    }

    let db_path = config.database_path();
    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("Database ready: {}", db_path.display());
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    match sessions::purge_expired(&pool).await {
        Ok(0) => {}
        Ok(n) => info!("Removed {} expired sessions", n),
        Err(e) => warn!("Expired session cleanup failed: {}", e),
    }

    let bind_addr = config.bind_addr();
    let state = AppState::from_config(pool, config);
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("newsroom-server listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("newsroom-server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
