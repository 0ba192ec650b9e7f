//! Readiness endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mongodb_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// 200 when the user store answers, 503 otherwise.
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let Some(mongo) = &state.mongo else {
        return (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                store: "memory".to_string(),
                mongodb_latency_ms: None,
                error: None,
            }),
        );
    };

    let health = database::mongodb::check_health_detailed(&mongo.db).await;
    let status = if health.healthy {
        StatusCode::OK
    } else {
        tracing::warn!(error = ?health.message, "MongoDB readiness check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            status: if health.healthy { "ready" } else { "unavailable" }.to_string(),
            store: "mongodb".to_string(),
            mongodb_latency_ms: Some(health.response_time_ms),
            error: health.message,
        }),
    )
}
