use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use database::postgres;
use migration::Migrator;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        name = config.app.name,
        version = config.app.version,
        "Starting subscriptions API"
    );

    let db = postgres::connect_from_config_with_retry(config.database.clone(), RetryConfig::startup())
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    postgres::run_migrations::<Migrator>(&db, config.app.name)
        .await
        .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

    let state = AppState { config, db };

    let probes = health_router(state.config.app).merge(api::ready_router(state.clone()));
    let app = create_router::<openapi::ApiDoc>(api::routes(&state), probes, &state.config.server)?;

    let server_config = state.config.server.clone();
    create_production_app(app, &server_config, async move {
        info!("Closing database pool");
        if let Err(e) = postgres::close(state.db).await {
            tracing::error!(error = %e, "Error closing PostgreSQL pool");
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Subscriptions API shutdown complete");
    Ok(())
}
