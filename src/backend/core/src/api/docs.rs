//! API documentation endpoints.
//!
//! Served without authentication so that clients can discover the API
//! before obtaining a token. The OpenAPI document is hand-maintained; the
//! surface is small enough that generated docs would add more machinery
//! than value.

use axum::Json;

/// GET /api-docs
pub async fn api_docs() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "artifact-manager",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Role-gated artifact management API",
        "openapi_document": "/api-docs/openapi.json",
        "authentication": {
            "scheme": "bearer",
            "token": "JWT issued by the configured identity provider",
            "roles": ["admin", "user", "readonly"]
        },
        "authorization": {
            "GET /api/**": "admin | user | readonly",
            "POST/PUT/PATCH /api/**": "admin | user",
            "DELETE /api/**": "admin",
            "/api/admin/**": "admin (any method)",
            "/api/actuator/**": "admin (any method, health excepted)",
            "public": ["/health", "/api-docs", "/swagger-ui", "/api/actuator/health"]
        }
    }))
}

/// GET /api-docs/openapi.json
pub async fn openapi_document() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Artifact Manager API",
            "description": "Artifact management endpoints gated by canonical roles",
            "version": env!("CARGO_PKG_VERSION")
        },
        "components": {
            "securitySchemes": {
                "bearerAuth": {
                    "type": "http",
                    "scheme": "bearer",
                    "bearerFormat": "JWT"
                }
            }
        },
        "security": [{ "bearerAuth": [] }],
        "paths": {
            "/api/artifacts": {
                "get": { "summary": "List artifacts", "tags": ["Artifacts"] },
                "post": { "summary": "Create artifact", "tags": ["Artifacts"] }
            },
            "/api/artifacts/{id}": {
                "get": { "summary": "Get artifact by ID", "tags": ["Artifacts"] },
                "put": { "summary": "Update artifact", "tags": ["Artifacts"] },
                "delete": { "summary": "Delete artifact", "tags": ["Artifacts"] }
            },
            "/api/admin/stats": {
                "get": { "summary": "System statistics", "tags": ["Admin"] }
            },
            "/api/admin/users": {
                "post": { "summary": "Create user", "tags": ["Admin"] }
            },
            "/api/admin/users/{id}": {
                "delete": { "summary": "Delete user", "tags": ["Admin"] }
            },
            "/health": {
                "get": { "summary": "Health report", "security": [] }
            }
        }
    }))
}
