//! Users API routes
//!
//! Wires the users domain to the configured store and seeds the bootstrap admin.

use axum::Router;
use domain_users::{
    Argon2Hasher, InMemoryUserRepository, MongoUserRepository, UserRepository, UserService,
    handlers,
};
use eyre::WrapErr;
use tracing::{info, warn};

use crate::config::{BootstrapAdmin, UserStoreBackend};
use crate::state::AppState;

pub async fn router(state: &AppState) -> eyre::Result<Router> {
    let hasher = Argon2Hasher::new(&state.config.password_hash)
        .map_err(|e| eyre::eyre!("Invalid password hash parameters: {}", e))?;
    let bootstrap = state.config.bootstrap_admin.as_ref();

    match (&state.config.store, &state.mongo) {
        (UserStoreBackend::MongoDb { collection, .. }, Some(mongo)) => {
            info!(collection = %collection, "Using MongoDB user store");
            let repository = MongoUserRepository::with_collection(&mongo.db, collection);
            build(repository, hasher, bootstrap).await
        }
        (UserStoreBackend::MongoDb { .. }, None) => {
            Err(eyre::eyre!("MongoDB user store selected but no connection was made"))
        }
        (UserStoreBackend::Memory, _) => {
            warn!("Using in-memory user store; records are lost on restart");
            if bootstrap.is_none() {
                warn!("No bootstrap admin configured; nobody can authenticate");
            }
            build(InMemoryUserRepository::new(), hasher, bootstrap).await
        }
    }
}

async fn build<R: UserRepository + 'static>(
    repository: R,
    hasher: Argon2Hasher,
    bootstrap: Option<&BootstrapAdmin>,
) -> eyre::Result<Router> {
    let service = UserService::with_hasher(repository, hasher);

    if let Some(admin) = bootstrap {
        service
            .ensure_bootstrap_admin(&admin.username, &admin.password)
            .await
            .wrap_err("Failed to seed bootstrap admin")?;
    }

    Ok(handlers::router(service))
}
