//! Server entry-point: loads settings, prepares the user store, and serves
//! the REST API with health probes and OpenAPI docs.

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use user_directory::inbound::http::health::HealthState;
use user_directory::outbound::persistence::{DbPool, run_pending_migrations};
use user_directory::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("bind_addr: {e}")))?;

    let mut config = ServerConfig::new(bind_addr);
    if let Some(pool_config) = settings.pool_config() {
        if settings.run_migrations() {
            let applied = run_pending_migrations(pool_config.database_url())
                .await
                .map_err(|e| io::Error::other(format!("migrations failed: {e}")))?;
            info!(applied, "database migrations complete");
        }
        let pool = DbPool::new(pool_config)
            .await
            .map_err(|e| io::Error::other(format!("database pool: {e}")))?;
        config = config.with_db_pool(pool);
    }

    info!(
        %bind_addr,
        persistent = config.has_db_pool(),
        "starting user directory server"
    );
    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
