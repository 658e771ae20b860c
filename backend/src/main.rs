//! Backend entry-point: loads configuration, prepares storage and serves the
//! REST API, notification socket and OpenAPI docs.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use communityfix::inbound::http::auth_config::{BuildMode, token_settings_from_env};
use communityfix::inbound::http::health::HealthState;
use communityfix::outbound::persistence::{DbPool, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server};

fn config_error(error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(error.to_string())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(config_error)?;
    let tokens = token_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(config_error)?;
    let bind_addr = settings.bind_addr().map_err(config_error)?;
    let origins = settings.origin_allow_list().map_err(config_error)?;
    let mut config = ServerConfig::new(bind_addr, origins, tokens);

    match settings.pool_config().map_err(config_error)? {
        Some(pool_config) => {
            run_pending_migrations(pool_config.database_url())
                .await
                .map_err(config_error)?;
            let pool = DbPool::new(pool_config).await.map_err(config_error)?;
            info!("using PostgreSQL persistence");
            config = config.with_db_pool(pool);
        }
        None => warn!("no database URL configured; state is kept in memory"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "server listening");
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
