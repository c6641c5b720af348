//! Artifact endpoints.
//!
//! The store is in-memory by design: this service's job is the role-gated
//! surface, not persistence. Reads are open to every role, writes to admin
//! and user, deletes to admin only; all of that is enforced by the
//! authorization layer before these handlers run.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{ApiResponse, AppState};
use crate::auth::AuthContext;
use crate::error::ServiceError;

// ═══════════════════════════════════════════════════════════════════════════════
// Model and store
// ═══════════════════════════════════════════════════════════════════════════════

/// A managed artifact.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Thread-safe in-memory artifact store.
pub struct ArtifactStore {
    artifacts: DashMap<u64, Artifact>,
    next_id: AtomicU64,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self {
            artifacts: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// A store pre-populated with sample artifacts.
    pub fn with_seed_data() -> Self {
        let store = Self::new();
        store.insert("Artifact 1", "library", None);
        store.insert("Artifact 2", "application", None);
        store
    }

    pub fn insert(&self, name: &str, artifact_type: &str, created_by: Option<String>) -> Artifact {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let artifact = Artifact {
            id,
            name: name.to_string(),
            artifact_type: artifact_type.to_string(),
            created_by,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.artifacts.insert(id, artifact.clone());
        artifact
    }

    pub fn list(&self) -> Vec<Artifact> {
        let mut all: Vec<Artifact> = self.artifacts.iter().map(|a| a.clone()).collect();
        all.sort_by_key(|a| a.id);
        all
    }

    pub fn get(&self, id: u64) -> Option<Artifact> {
        self.artifacts.get(&id).map(|a| a.clone())
    }

    pub fn update(&self, id: u64, name: &str, artifact_type: &str) -> Option<Artifact> {
        let mut entry = self.artifacts.get_mut(&id)?;
        entry.name = name.to_string();
        entry.artifact_type = artifact_type.to_string();
        entry.updated_at = Some(Utc::now());
        Some(entry.clone())
    }

    pub fn remove(&self, id: u64) -> Option<Artifact> {
        self.artifacts.remove(&id).map(|(_, a)| a)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Handlers
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct ArtifactRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedArtifact {
    pub id: u64,
    pub deleted_at: DateTime<Utc>,
}

/// GET /api/artifacts
pub async fn list_artifacts(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.store.list()))
}

/// GET /api/artifacts/{id}
pub async fn get_artifact(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ServiceError> {
    let artifact = state
        .store
        .get(id)
        .ok_or(ServiceError::ArtifactNotFound(id))?;

    Ok(Json(ApiResponse::success(artifact)))
}

/// POST /api/artifacts
pub async fn create_artifact(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(req): Json<ArtifactRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if req.name.trim().is_empty() {
        return Err(ServiceError::InvalidRequest("artifact name is empty".into()));
    }

    let artifact = state
        .store
        .insert(&req.name, &req.artifact_type, Some(ctx.subject));

    Ok(Json(ApiResponse::success(artifact)))
}

/// PUT /api/artifacts/{id}
pub async fn update_artifact(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ArtifactRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if req.name.trim().is_empty() {
        return Err(ServiceError::InvalidRequest("artifact name is empty".into()));
    }

    let artifact = state
        .store
        .update(id, &req.name, &req.artifact_type)
        .ok_or(ServiceError::ArtifactNotFound(id))?;

    Ok(Json(ApiResponse::success(artifact)))
}

/// DELETE /api/artifacts/{id}
pub async fn delete_artifact(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ServiceError> {
    let artifact = state
        .store
        .remove(id)
        .ok_or(ServiceError::ArtifactNotFound(id))?;

    Ok(Json(ApiResponse::success(DeletedArtifact {
        id: artifact.id,
        deleted_at: Utc::now(),
    })))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_data() {
        let store = ArtifactStore::with_seed_data();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().name, "Artifact 1");
        assert_eq!(store.get(2).unwrap().artifact_type, "application");
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let store = ArtifactStore::with_seed_data();
        let created = store.insert("Artifact 3", "library", Some("alice".into()));

        assert_eq!(created.id, 3);
        assert_eq!(created.created_by.as_deref(), Some("alice"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_update_sets_updated_at() {
        let store = ArtifactStore::with_seed_data();
        let updated = store.update(1, "Renamed", "application").unwrap();

        assert_eq!(updated.name, "Renamed");
        assert!(updated.updated_at.is_some());
        assert!(store.update(99, "x", "y").is_none());
    }

    #[test]
    fn test_remove() {
        let store = ArtifactStore::with_seed_data();
        assert!(store.remove(1).is_some());
        assert!(store.remove(1).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_sorted_by_id() {
        let store = ArtifactStore::with_seed_data();
        store.insert("Artifact 3", "library", None);

        let ids: Vec<u64> = store.list().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_type_field_renamed_in_json() {
        let store = ArtifactStore::with_seed_data();
        let json = serde_json::to_value(store.get(1).unwrap()).unwrap();
        assert_eq!(json["type"], "library");
        assert!(json.get("artifact_type").is_none());
    }
}
