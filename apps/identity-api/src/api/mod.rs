//! API routes, nested under `/api` by `axum_helpers::create_router`.

pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

pub async fn routes(state: &AppState) -> eyre::Result<Router> {
    Ok(Router::new()
        .nest("/authentication", users::router(state).await?)
        .merge(health::router(state.clone())))
}
