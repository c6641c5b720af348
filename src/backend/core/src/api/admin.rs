//! Administrative endpoints.
//!
//! Everything under `/api/admin` is admin-only for any HTTP method; the
//! authorization layer enforces that before these handlers run. User
//! management is a mock surface with no backing registry.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiResponse, AppState};
use crate::auth::AuthContext;

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub total_artifacts: usize,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub id: Uuid,
    pub username: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DeletedUser {
    pub id: u64,
    pub deleted_at: DateTime<Utc>,
}

/// GET /api/admin/stats
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(AdminStats {
        total_artifacts: state.store.len(),
        uptime_seconds: state.health.uptime_seconds(),
        timestamp: Utc::now(),
    }))
}

/// POST /api/admin/users
pub async fn create_user(
    ctx: AuthContext,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    Json(ApiResponse::success(CreatedUser {
        id: Uuid::new_v4(),
        username: req.username,
        created_by: ctx.subject,
        created_at: Utc::now(),
    }))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(Path(id): Path<u64>) -> impl IntoResponse {
    Json(ApiResponse::success(DeletedUser {
        id,
        deleted_at: Utc::now(),
    }))
}
