//! JWT claim shapes consumed by role normalization.
//!
//! The service never issues production tokens; these types describe what the
//! external identity providers put into tokens we verify. Both provider
//! shapes live on one struct: Azure Entra delivers a flat `roles` list,
//! Keycloak nests its list under `realm_access.roles`. Which one is read is
//! decided by configuration, not by sniffing the token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Verified JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (caller identity)
    pub sub: String,

    /// Preferred username, if the provider includes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    /// Flat role list (Azure Entra shape)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Realm-scoped access map (Keycloak shape)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm_access: Option<RealmAccess>,

    /// Token ID
    #[serde(default = "generate_jti")]
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Other claims the provider includes; carried but unused
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// The `realm_access` claim Keycloak nests roles under.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

fn generate_jti() -> String {
    Uuid::new_v4().to_string()
}

impl Claims {
    /// Start building claims for a subject. Used by the dev-token CLI and
    /// tests; production tokens come from the identity provider.
    pub fn builder(sub: impl Into<String>) -> ClaimsBuilder {
        ClaimsBuilder::new(sub)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Builder for claims.
pub struct ClaimsBuilder {
    claims: Claims,
}

impl ClaimsBuilder {
    pub fn new(sub: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            claims: Claims {
                sub: sub.into(),
                preferred_username: None,
                roles: Vec::new(),
                realm_access: None,
                jti: generate_jti(),
                iat: now.timestamp(),
                exp: (now + Duration::hours(1)).timestamp(),
                iss: None,
                extra: HashMap::new(),
            },
        }
    }

    /// Set the flat `roles` claim (Azure Entra shape).
    pub fn roles(mut self, roles: Vec<String>) -> Self {
        self.claims.roles = roles;
        self
    }

    /// Set `realm_access.roles` (Keycloak shape).
    pub fn realm_roles(mut self, roles: Vec<String>) -> Self {
        self.claims.realm_access = Some(RealmAccess { roles });
        self
    }

    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.claims.iss = Some(iss.into());
        self
    }

    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.claims.exp = (Utc::now() + duration).timestamp();
        self
    }

    pub fn build(self) -> Claims {
        self.claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let claims = Claims::builder("alice").build();
        assert_eq!(claims.sub, "alice");
        assert!(claims.roles.is_empty());
        assert!(claims.realm_access.is_none());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_realm_access_deserializes() {
        let json = serde_json::json!({
            "sub": "svc",
            "iat": 0,
            "exp": 32503680000i64,
            "realm_access": { "roles": ["artifact-admin", "offline_access"] }
        });

        let claims: Claims = serde_json::from_value(json).unwrap();
        let realm = claims.realm_access.unwrap();
        assert_eq!(realm.roles, vec!["artifact-admin", "offline_access"]);
    }

    #[test]
    fn test_missing_realm_access_is_none() {
        let json = serde_json::json!({ "sub": "svc", "iat": 0, "exp": 0 });
        let claims: Claims = serde_json::from_value(json).unwrap();
        assert!(claims.realm_access.is_none());
        assert!(claims.roles.is_empty());
    }

    #[test]
    fn test_expired() {
        let claims = Claims::builder("bob")
            .expires_in(Duration::hours(-1))
            .build();
        assert!(claims.is_expired());
    }
}
