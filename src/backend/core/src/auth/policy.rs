//! Route authorization policy.
//!
//! The policy is an explicit ordered list of route rules evaluated
//! first-match, top to bottom. It answers one question per request: may this
//! caller, with this normalized role set, perform this method on this path?
//! The table is fixed at process start and never mutated, so decisions are
//! pure and can run fully in parallel across in-flight requests.

use axum::http::Method;
use tracing::debug;

use super::roles::{Role, RoleSet};

// ═══════════════════════════════════════════════════════════════════════════════
// Decision
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a policy evaluation. Two-valued; a deny carries the reason kind
/// the HTTP layer needs to pick between 401 and 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit,
    Deny(DenyReason),
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No usable credential was presented.
    Unauthenticated,
    /// The credential is valid but the role set does not satisfy the rule.
    InsufficientRole,
}

impl Decision {
    pub fn is_permit(&self) -> bool {
        matches!(self, Self::Permit)
    }

    pub fn is_deny(&self) -> bool {
        !self.is_permit()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Caller
// ═══════════════════════════════════════════════════════════════════════════════

/// The caller as seen by the policy: either anonymous (no verified
/// credential) or authenticated with a normalized role set. An authenticated
/// caller with zero recognized roles is still authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(RoleSet),
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    pub fn with_roles(roles: RoleSet) -> Self {
        Self::Authenticated(roles)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    fn roles(&self) -> Option<&RoleSet> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(roles) => Some(roles),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Route rules
// ═══════════════════════════════════════════════════════════════════════════════

/// Which HTTP methods a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodPattern {
    Any,
    Only(Vec<Method>),
}

impl MethodPattern {
    fn matches(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(methods) => methods.contains(method),
        }
    }
}

/// Which request paths a rule applies to. Prefix matching is segment-aware:
/// `/api` matches `/api` and `/api/x` but not `/apifoo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Any,
    Exact(&'static str),
    Prefix(&'static str),
}

impl PathPattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(p) => path == *p,
            Self::Prefix(p) => {
                path == *p
                    || path
                        .strip_prefix(p)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// What a matched rule requires of the caller. Role sets combine as any-of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// No credential and no role required.
    Public,
    /// A verified credential whose role set intersects the given roles.
    AnyOf(Vec<Role>),
    /// A verified credential; no role constraint.
    Authenticated,
}

/// One entry of the static policy table.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Short name used in logs and the CLI rule listing.
    pub name: &'static str,
    pub methods: MethodPattern,
    pub path: PathPattern,
    pub access: Access,
}

impl RouteRule {
    pub fn new(
        name: &'static str,
        methods: MethodPattern,
        path: PathPattern,
        access: Access,
    ) -> Self {
        Self {
            name,
            methods,
            path,
            access,
        }
    }

    fn public(name: &'static str, path: PathPattern) -> Self {
        Self::new(name, MethodPattern::Any, path, Access::Public)
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.methods.matches(method) && self.path.matches(path)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Policy engine
// ═══════════════════════════════════════════════════════════════════════════════

/// First-match evaluator over the ordered rule table.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    rules: Vec<RouteRule>,
}

impl PolicyEngine {
    /// Build the engine with the service's standard rule table.
    ///
    /// Ordering is significant: public routes match first and skip the role
    /// check entirely; the admin-only prefixes come before the method-scoped
    /// general API rules so that `/api/admin` is never widened by the
    /// general GET rule; the trailing catch-all permits any authenticated
    /// caller with no role constraint.
    pub fn new() -> Self {
        Self::with_rules(vec![
            RouteRule::public("api-docs", PathPattern::Prefix("/api-docs")),
            RouteRule::public("swagger-ui", PathPattern::Prefix("/swagger-ui")),
            RouteRule::public("swagger-ui-page", PathPattern::Exact("/swagger-ui.html")),
            RouteRule::public("health", PathPattern::Prefix("/health")),
            RouteRule::public("actuator-health", PathPattern::Prefix("/api/actuator/health")),
            RouteRule::new(
                "admin",
                MethodPattern::Any,
                PathPattern::Prefix("/api/admin"),
                Access::AnyOf(vec![Role::Admin]),
            ),
            RouteRule::new(
                "actuator",
                MethodPattern::Any,
                PathPattern::Prefix("/api/actuator"),
                Access::AnyOf(vec![Role::Admin]),
            ),
            RouteRule::new(
                "api-read",
                MethodPattern::Only(vec![Method::GET]),
                PathPattern::Prefix("/api"),
                Access::AnyOf(vec![Role::Admin, Role::User, Role::ReadOnly]),
            ),
            RouteRule::new(
                "api-write",
                MethodPattern::Only(vec![Method::POST, Method::PUT, Method::PATCH]),
                PathPattern::Prefix("/api"),
                Access::AnyOf(vec![Role::Admin, Role::User]),
            ),
            RouteRule::new(
                "api-delete",
                MethodPattern::Only(vec![Method::DELETE]),
                PathPattern::Prefix("/api"),
                Access::AnyOf(vec![Role::Admin]),
            ),
            RouteRule::new(
                "authenticated-fallback",
                MethodPattern::Any,
                PathPattern::Any,
                Access::Authenticated,
            ),
        ])
    }

    /// Build an engine over a custom rule list.
    pub fn with_rules(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// The ordered rule table.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// First rule matching the request, if any.
    pub fn matching_rule(&self, method: &Method, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|r| r.matches(method, path))
    }

    /// Evaluate the policy for one request.
    pub fn evaluate(&self, method: &Method, path: &str, caller: &Caller) -> Decision {
        match self.matching_rule(method, path) {
            Some(rule) => {
                let decision = Self::apply(rule, caller);
                debug!(
                    rule = rule.name,
                    %method,
                    path,
                    permit = decision.is_permit(),
                    "Authorization decision"
                );
                decision
            }
            // The standard table ends in a catch-all; a custom table without
            // one denies whatever it does not cover.
            None => match caller {
                Caller::Anonymous => Decision::Deny(DenyReason::Unauthenticated),
                Caller::Authenticated(_) => Decision::Deny(DenyReason::InsufficientRole),
            },
        }
    }

    fn apply(rule: &RouteRule, caller: &Caller) -> Decision {
        match &rule.access {
            Access::Public => Decision::Permit,
            Access::Authenticated => match caller.roles() {
                Some(_) => Decision::Permit,
                None => Decision::Deny(DenyReason::Unauthenticated),
            },
            Access::AnyOf(required) => match caller.roles() {
                None => Decision::Deny(DenyReason::Unauthenticated),
                Some(roles) if roles.intersects(required) => Decision::Permit,
                Some(_) => Decision::Deny(DenyReason::InsufficientRole),
            },
        }
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(roles: &[Role]) -> Caller {
        Caller::with_roles(roles.iter().copied().collect())
    }

    fn engine() -> PolicyEngine {
        PolicyEngine::new()
    }

    #[test]
    fn test_readonly_can_read_api() {
        let decision = engine().evaluate(&Method::GET, "/api/artifacts", &caller(&[Role::ReadOnly]));
        assert_eq!(decision, Decision::Permit);
    }

    #[test]
    fn test_user_cannot_delete() {
        let decision = engine().evaluate(&Method::DELETE, "/api/artifacts/5", &caller(&[Role::User]));
        assert_eq!(decision, Decision::Deny(DenyReason::InsufficientRole));
    }

    #[test]
    fn test_admin_can_delete() {
        let decision = engine().evaluate(&Method::DELETE, "/api/artifacts/5", &caller(&[Role::Admin]));
        assert_eq!(decision, Decision::Permit);
    }

    #[test]
    fn test_writes_need_admin_or_user() {
        let e = engine();
        for method in [Method::POST, Method::PUT, Method::PATCH] {
            assert_eq!(
                e.evaluate(&method, "/api/artifacts", &caller(&[Role::User])),
                Decision::Permit
            );
            assert_eq!(
                e.evaluate(&method, "/api/artifacts", &caller(&[Role::ReadOnly])),
                Decision::Deny(DenyReason::InsufficientRole)
            );
        }
    }

    #[test]
    fn test_admin_prefix_shadows_general_get_rule() {
        let e = engine();

        assert_eq!(
            e.evaluate(&Method::GET, "/api/admin/stats", &caller(&[Role::User])),
            Decision::Deny(DenyReason::InsufficientRole)
        );
        assert_eq!(
            e.evaluate(&Method::GET, "/api/admin/stats", &caller(&[Role::Admin])),
            Decision::Permit
        );
    }

    #[test]
    fn test_docs_are_public() {
        let decision = engine().evaluate(
            &Method::GET,
            "/api-docs/index.html",
            &Caller::anonymous(),
        );
        assert_eq!(decision, Decision::Permit);
    }

    #[test]
    fn test_actuator_health_public_rest_admin_only() {
        let e = engine();

        assert_eq!(
            e.evaluate(&Method::GET, "/api/actuator/health", &Caller::anonymous()),
            Decision::Permit
        );
        assert_eq!(
            e.evaluate(&Method::GET, "/api/actuator/metrics", &caller(&[Role::User])),
            Decision::Deny(DenyReason::InsufficientRole)
        );
        assert_eq!(
            e.evaluate(&Method::GET, "/api/actuator/metrics", &caller(&[Role::Admin])),
            Decision::Permit
        );
    }

    #[test]
    fn test_zero_roles_denied_on_every_gated_rule() {
        let e = engine();
        let empty = caller(&[]);

        for (method, path) in [
            (Method::GET, "/api/artifacts"),
            (Method::POST, "/api/artifacts"),
            (Method::DELETE, "/api/artifacts/1"),
            (Method::GET, "/api/admin/stats"),
        ] {
            assert_eq!(
                e.evaluate(&method, path, &empty),
                Decision::Deny(DenyReason::InsufficientRole),
                "{} {}",
                method,
                path
            );
        }
    }

    #[test]
    fn test_authenticated_fallback_permits_unmatched_routes() {
        let e = engine();

        assert_eq!(
            e.evaluate(&Method::GET, "/internal/debug", &caller(&[])),
            Decision::Permit
        );
        assert_eq!(
            e.evaluate(&Method::GET, "/internal/debug", &Caller::anonymous()),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn test_anonymous_denied_on_gated_routes() {
        let decision = engine().evaluate(&Method::GET, "/api/artifacts", &Caller::anonymous());
        assert_eq!(decision, Decision::Deny(DenyReason::Unauthenticated));
    }

    #[test]
    fn test_prefix_matching_is_segment_aware() {
        let e = engine();

        // "/apifoo" is not under the "/api" prefix; it falls through to the
        // authenticated catch-all.
        assert_eq!(
            e.evaluate(&Method::DELETE, "/apifoo", &caller(&[Role::ReadOnly])),
            Decision::Permit
        );
        assert_eq!(
            e.evaluate(&Method::DELETE, "/api", &caller(&[Role::ReadOnly])),
            Decision::Deny(DenyReason::InsufficientRole)
        );
    }

    #[test]
    fn test_first_match_wins_over_later_rules() {
        let e = PolicyEngine::with_rules(vec![
            RouteRule::new(
                "deny-writes",
                MethodPattern::Only(vec![Method::POST]),
                PathPattern::Prefix("/api"),
                Access::AnyOf(vec![Role::Admin]),
            ),
            RouteRule::new(
                "everything",
                MethodPattern::Any,
                PathPattern::Any,
                Access::Public,
            ),
        ]);

        assert_eq!(
            e.evaluate(&Method::POST, "/api/x", &caller(&[Role::User])),
            Decision::Deny(DenyReason::InsufficientRole)
        );
        assert_eq!(
            e.evaluate(&Method::GET, "/api/x", &Caller::anonymous()),
            Decision::Permit
        );
    }

    #[test]
    fn test_custom_table_without_catch_all_denies() {
        let e = PolicyEngine::with_rules(vec![]);

        assert_eq!(
            e.evaluate(&Method::GET, "/anything", &Caller::anonymous()),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            e.evaluate(&Method::GET, "/anything", &caller(&[Role::Admin])),
            Decision::Deny(DenyReason::InsufficientRole)
        );
    }
}
