//! Request authorization middleware.
//!
//! Wires the token verifier, role normalization, and the policy engine into
//! the router as a tower layer. Per request: public routes pass straight
//! through; everything else requires a bearer token, which is verified and
//! normalized before the policy decides. Deny maps to 401 when no usable
//! credential was presented and 403 when the role set is insufficient.

use axum::{
    body::Body,
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use metrics::counter;
use std::{
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};
use tracing::warn;

use super::claims::Claims;
use super::policy::{Caller, Decision, DenyReason, PolicyEngine};
use super::roles::{Role, RoleSet};
use super::verifier::{AuthError, TokenVerifier};

// ═══════════════════════════════════════════════════════════════════════════════
// Authorization context
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-request authorization context, injected into request extensions once
/// the policy has permitted the request. Immutable for the request's
/// duration.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The verified subject.
    pub subject: String,

    /// Normalized canonical roles.
    pub roles: RoleSet,

    /// Token ID, for correlation in logs.
    pub token_id: String,

    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

impl AuthContext {
    fn new(claims: &Claims, roles: RoleSet) -> Self {
        Self {
            subject: claims.sub.clone(),
            roles,
            token_id: claims.jti.clone(),
            expires_at: claims.expires_at(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tower Layer
// ═══════════════════════════════════════════════════════════════════════════════

/// Authorization layer enforcing the route policy on every request.
#[derive(Clone)]
pub struct AuthLayer {
    verifier: Arc<TokenVerifier>,
    engine: Arc<PolicyEngine>,
}

impl AuthLayer {
    pub fn new(verifier: Arc<TokenVerifier>, engine: Arc<PolicyEngine>) -> Self {
        Self { verifier, engine }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            verifier: self.verifier.clone(),
            engine: self.engine.clone(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tower Service
// ═══════════════════════════════════════════════════════════════════════════════

/// Service enforcing authentication and the authorization policy.
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    verifier: Arc<TokenVerifier>,
    engine: Arc<PolicyEngine>,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let verifier = self.verifier.clone();
        let engine = self.engine.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let method = request.method().clone();
            let path = request.uri().path().to_string();

            // Public routes permit anonymous callers; skip credential
            // handling entirely.
            if engine
                .evaluate(&method, &path, &Caller::anonymous())
                .is_permit()
            {
                return inner.call(request).await;
            }

            // Authentication failures are hard failures, rejected before
            // the policy runs.
            let token = match extract_bearer(request.headers()) {
                Some(token) => token,
                None => return Ok(AuthError::MissingCredentials.into_response()),
            };

            let claims = match verifier.verify(&token).await {
                Ok(claims) => claims,
                Err(e) => return Ok(e.into_response()),
            };

            let roles = verifier.idp_type().normalize(&claims);
            let caller = Caller::with_roles(roles.clone());

            match engine.evaluate(&method, &path, &caller) {
                Decision::Permit => {
                    counter!(
                        "auth_success_total",
                        "idp" => verifier.idp_type().as_str()
                    )
                    .increment(1);

                    request
                        .extensions_mut()
                        .insert(AuthContext::new(&claims, roles));
                    inner.call(request).await
                }
                Decision::Deny(DenyReason::InsufficientRole) => {
                    warn!(
                        subject = claims.sub.as_str(),
                        %roles,
                        %method,
                        path = path.as_str(),
                        "Request denied: insufficient role"
                    );
                    Ok(AuthError::InsufficientRole.into_response())
                }
                Decision::Deny(DenyReason::Unauthenticated) => {
                    Ok(AuthError::MissingCredentials.into_response())
                }
            }
        })
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| {
            s.strip_prefix("Bearer ")
                .or_else(|| s.strip_prefix("bearer "))
                .map(|t| t.to_string())
        })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi".to_string()));

        let mut lowercase = HeaderMap::new();
        lowercase.insert(AUTHORIZATION, "bearer tok".parse().unwrap());
        assert_eq!(extract_bearer(&lowercase), Some("tok".to_string()));
    }

    #[test]
    fn test_extract_bearer_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic dXNlcjpwdw==".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    #[test]
    fn test_auth_context_role_check() {
        let claims = Claims::builder("alice").build();
        let ctx = AuthContext::new(&claims, [Role::Admin].into_iter().collect());

        assert_eq!(ctx.subject, "alice");
        assert!(ctx.has_role(Role::Admin));
        assert!(!ctx.has_role(Role::ReadOnly));
    }
}
