//! # Artifact Manager Core
//!
//! A role-gated artifact management service.
//!
//! ## Architecture
//!
//! - **Authorization Policy**: an ordered route-rule table evaluated
//!   first-match per request; the engineering core of the service
//! - **Role Normalization**: Keycloak and Azure Entra token shapes reduced
//!   to one canonical role set, selected by configuration
//! - **Token Verification**: JWKS / OIDC discovery / HS256 dev keys
//! - **HTTP API**: artifact CRUD, admin, documentation, and health surfaces
//! - **Observability**: structured logging, optional OTLP traces, Prometheus
//!   counters

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod observability;

pub use error::{ErrorCode, Result, ServiceError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{build_router, ApiResponse, AppState};
    pub use crate::auth::{
        AuthConfig, AuthContext, AuthError, AuthLayer, Caller, Claims, Decision, DenyReason,
        IdpType, PolicyEngine, Role, RoleSet, RouteRule, TokenVerifier,
    };
    pub use crate::config::Config;
    pub use crate::error::{ErrorCode, Result, ServiceError};
    pub use crate::health::HealthService;
}
