use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::{Config, UserStoreBackend};
use state::{AppState, MongoHandles};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let mongo = match &config.store {
        UserStoreBackend::MongoDb { mongodb, .. } => {
            let client = database::mongodb::connect_from_config_with_retry(mongodb, None).await?;
            let db = client.database(mongodb.database());
            info!(database = %mongodb.database(), "Connected to MongoDB");
            Some(MongoHandles { client, db })
        }
        UserStoreBackend::Memory => None,
    };

    let state = AppState { config, mongo };

    let api_routes = api::routes(&state).await?;
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes)?;
    let app = router.merge(health_router(state.config.app));

    info!(
        "Starting {} v{} (30s shutdown timeout)",
        state.config.app.name, state.config.app.version
    );

    let server_config = state.config.server.clone();
    create_production_app(app, &server_config, Duration::from_secs(30), async move {
        if let Some(mongo) = state.mongo {
            info!("Shutting down: closing MongoDB connections");
            mongo.client.shutdown().await;
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Identity API shutdown complete");
    Ok(())
}
