//! Health check HTTP routes

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::{LivenessResponse, ReadinessResponse};
use crate::api::AppState;

/// GET /health - Basic health check
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.health.report()))
}

/// GET /health/live - Liveness probe for Kubernetes
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(LivenessResponse::alive()))
}

/// GET /health/ready - Readiness probe for Kubernetes
pub async fn readiness_check() -> impl IntoResponse {
    // No external dependencies to wait on; ready as soon as we serve.
    (StatusCode::OK, Json(ReadinessResponse { ready: true }))
}
