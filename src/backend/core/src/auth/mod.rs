//! Authentication and request authorization.
//!
//! This module provides:
//! - **Roles**: the canonical role set and order-preserving normalization
//! - **IdP converters**: Keycloak and Azure Entra role-claim shapes,
//!   selected by static configuration
//! - **Policy Engine**: an ordered route-rule table evaluated first-match
//! - **Token verification**: JWKS/issuer-discovery or HS256 dev keys
//! - **Middleware**: the tower layer enforcing the policy per request
//!
//! # Usage
//!
//! ```rust,ignore
//! use artifact_core::auth::{AuthLayer, PolicyEngine, TokenVerifier, AuthConfig};
//!
//! let verifier = Arc::new(TokenVerifier::new(AuthConfig::default())?);
//! let engine = Arc::new(PolicyEngine::new());
//!
//! let app = Router::new()
//!     .route("/api/artifacts", get(list_artifacts))
//!     .layer(AuthLayer::new(verifier, engine));
//! ```

pub mod claims;
pub mod idp;
pub mod middleware;
pub mod policy;
pub mod roles;
pub mod verifier;

pub use claims::{Claims, ClaimsBuilder, RealmAccess};
pub use idp::IdpType;
pub use middleware::{AuthContext, AuthLayer, AuthService};
pub use policy::{
    Access, Caller, Decision, DenyReason, MethodPattern, PathPattern, PolicyEngine, RouteRule,
};
pub use roles::{Role, RoleSet};
pub use verifier::{AuthConfig, AuthError, TokenVerifier};
