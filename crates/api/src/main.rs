use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

use persistence::{MemoryStore, Stores};
use tax_business_api::{
    app::{self, AppState},
    config::{Backend, Config},
    middleware,
    shutdown::shutdown_signal,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    middleware::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;
    middleware::init_metrics().context("Failed to install metrics recorder")?;

    info!("Starting Tax Business API v{}", env!("CARGO_PKG_VERSION"));

    let (stores, pool) = match config.database.backend {
        Backend::Postgres => {
            let pool = persistence::db::create_pool(&config.database.pool_config())
                .await
                .context("Failed to connect to database")?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            (Stores::postgres(pool.clone()), Some(pool))
        }
        Backend::Memory => {
            info!("Using in-memory datastore; data is lost on exit");
            (Stores::memory(MemoryStore::new()), None)
        }
    };

    let addr = config.socket_addr()?;
    let grace = Duration::from_secs(config.server.shutdown_grace_secs);

    let state = AppState::new(config, stores, pool);
    let audit = state.audit.clone();
    let app = app::create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if tokio::time::timeout(grace, audit.flush()).await.is_err() {
        tracing::warn!("Audit queue not drained before shutdown");
    }
    info!("Server stopped");

    Ok(())
}
