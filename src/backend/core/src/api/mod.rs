//! HTTP API layer.
//!
//! One router, assembled at startup: public health and documentation
//! routes, the artifact CRUD surface, and the admin surface. The
//! authorization layer wraps all of it; route handlers never re-check
//! roles.

pub mod admin;
pub mod artifacts;
pub mod docs;

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::AuthLayer;
use crate::health::{self, HealthService};

use self::artifacts::ArtifactStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ArtifactStore>,
    pub health: Arc<HealthService>,
    pub metrics: PrometheusHandle,
}

/// Build the API router.
///
/// The auth layer sits directly over the routes; trace, compression, and
/// CORS wrap it so that preflight requests and response encoding never hit
/// credential handling.
pub fn build_router(state: AppState, auth: AuthLayer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Public: health and documentation
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/actuator/health", get(health::health_check))
        .route("/api-docs", get(docs::api_docs))
        .route("/api-docs/openapi.json", get(docs::openapi_document))
        // Admin-gated actuator surface
        .route("/api/actuator/metrics", get(prometheus_metrics))
        // Artifact surface
        .route(
            "/api/artifacts",
            get(artifacts::list_artifacts).post(artifacts::create_artifact),
        )
        .route(
            "/api/artifacts/:id",
            get(artifacts::get_artifact)
                .put(artifacts::update_artifact)
                .delete(artifacts::delete_artifact),
        )
        // Admin surface
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/users", post(admin::create_user))
        .route("/api/admin/users/:id", delete(admin::delete_user))
        // Middleware
        .layer(auth)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// GET /api/actuator/metrics - Prometheus render, admin-gated by the policy.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.render(),
    )
}

/// API response wrapper.
#[derive(serde::Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success("test data");
        assert!(response.success);
        assert_eq!(response.data, Some("test data"));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_api_response_error() {
        let response: ApiResponse<()> = ApiResponse::error("test error");
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error, Some("test error".to_string()));
    }
}
