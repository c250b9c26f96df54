//! Health Check Handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::application::dto::response::ApiResponse;
use crate::infrastructure::metrics;
use crate::startup::AppState;

/// Health payload
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// Basic health check
pub async fn health_check() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::ok(
        "ok",
        HealthStatus {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
        },
    ))
}

/// Liveness probe: the process is up.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe: the database answers.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => {
            metrics::update_db_pool_stats(
                state.db.num_idle() as u32,
                state.db.size() - state.db.num_idle() as u32,
                state.db.options().get_max_connections(),
            );
            StatusCode::OK
        }
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
