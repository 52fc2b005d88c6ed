use std::{net::SocketAddr, sync::Arc};

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskboard_api::app::{app, AppState};
use taskboard_api::config;
use taskboard_api::database::{DatabaseManager, EntityStore, MemoryStore, PgStore};
use taskboard_api::is_production;

#[derive(Debug, Parser)]
#[command(name = "taskboard-api", version, about = "Project and task board REST API")]
struct Args {
    /// Port to listen on (overrides APP_PORT / PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Keep all data in process memory instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,

    /// Do not run pending migrations on startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and JWT_SECRET are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn")),
        )
        .init();

    let args = Args::parse();
    let config = config::config();
    tracing::info!("Starting taskboard API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        bail!("JWT_SECRET must be set in {:?} mode", config.environment);
    }

    let store: Arc<dyn EntityStore> = if args.in_memory {
        if is_production!() {
            tracing::warn!("In-memory store selected in production; data is lost on exit");
        }
        tracing::info!("Using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        let pool = DatabaseManager::connect(&config.database).await?;
        if args.skip_migrations {
            tracing::info!("Skipping migrations");
        } else {
            DatabaseManager::migrate(&pool).await?;
        }
        Arc::new(PgStore::new(pool))
    };

    let port = args.port.unwrap_or(config.api.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Taskboard API listening on http://{}", addr);

    axum::serve(listener, app(AppState::new(store)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
