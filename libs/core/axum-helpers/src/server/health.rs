use axum::{Json, Router, routing::get};
use core_config::AppInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub name: String,
    pub version: String,
}

/// Liveness endpoint at `/health`. Always 200 while the process serves requests;
/// dependency checks belong in the app's readiness route.
pub fn health_router(app: AppInfo) -> Router {
    Router::new().route(
        "/health",
        get(move || async move {
            Json(HealthResponse {
                status: "ok".to_string(),
                name: app.name.to_string(),
                version: app.version.to_string(),
            })
        }),
    )
}
