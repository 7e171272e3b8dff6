//! coinmatch-api - HTTP backend for the CoinMatch provenance tracker
//!
//! Serves the museum coin catalog, marketplace candidate search, the
//! heuristic match generator, and the curator decision log.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use coinmatch_api::{build_router, AppState};
use coinmatch_common::config::{Settings, SettingsOverrides};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "coinmatch-api", about = "CoinMatch provenance tracking backend")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Bind host for the HTTP server
    #[arg(long)]
    host: Option<String>,

    /// Bind port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification first, before any database delays
    info!(
        "Starting CoinMatch API v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();
    let settings = Settings::load(&SettingsOverrides {
        config_file: cli.config,
        database_path: cli.database,
        host: cli.host,
        port: cli.port,
    })?;

    info!("Database path: {}", settings.database_path.display());
    let pool = coinmatch_common::db::init_database(&settings.database_path).await?;

    // First-run seeding so the API is reachable on an empty database
    coinmatch_api::db::users::ensure_default_user(&pool).await?;

    let bind_addr = settings.bind_addr();
    let state = AppState::new(pool, settings);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("coinmatch-api listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
