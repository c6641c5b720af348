//! Identity-provider role normalization.
//!
//! Two providers are supported and the active one is selected by static
//! configuration (`auth.idp_type`), never detected from the token itself.
//! Each provider ships roles in its own shape; normalization reduces both to
//! the same canonical [`RoleSet`].

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use super::claims::Claims;
use super::roles::{Role, RoleSet};

/// The raw tags Azure Entra app-role assignments may carry. Underscored
/// variants appear when roles were provisioned through the legacy manifest.
const AZURE_RECOGNIZED_TAGS: [&str; 6] = [
    "artifact-admin",
    "artifact-user",
    "artifact-readonly",
    "artifact_admin",
    "artifact_user",
    "artifact_readonly",
];

/// Supported identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdpType {
    /// Azure Entra ID: flat `roles` claim, hyphenated and underscored tags.
    Azure,
    /// Keycloak: `realm_access.roles`, hyphenated tags only.
    #[default]
    Keycloak,
}

impl IdpType {
    /// Normalize the provider-shaped role claims into the canonical set.
    ///
    /// A missing or empty claim yields an empty set; unrecognized tags are
    /// dropped silently. Neither case is an error.
    pub fn normalize(&self, claims: &Claims) -> RoleSet {
        match self {
            Self::Azure => normalize_azure(claims),
            Self::Keycloak => normalize_keycloak(claims),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Azure => "azure",
            Self::Keycloak => "keycloak",
        }
    }
}

impl fmt::Display for IdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdpType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "azure" => Ok(Self::Azure),
            "keycloak" => Ok(Self::Keycloak),
            other => Err(format!(
                "unknown idp type '{}', expected 'azure' or 'keycloak'",
                other
            )),
        }
    }
}

/// Azure Entra: keep the six recognized literal forms, fold underscores to
/// hyphens, dedup preserving first-seen order.
fn normalize_azure(claims: &Claims) -> RoleSet {
    claims
        .roles
        .iter()
        .filter(|tag| AZURE_RECOGNIZED_TAGS.contains(&tag.as_str()))
        .filter_map(|tag| Role::from_raw_tag(&tag.replace('_', "-")))
        .collect()
}

/// Keycloak: read `realm_access.roles`, hyphenated forms only.
fn normalize_keycloak(claims: &Claims) -> RoleSet {
    let Some(realm) = &claims.realm_access else {
        return RoleSet::new();
    };

    realm
        .roles
        .iter()
        .filter_map(|tag| Role::from_raw_tag(tag))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn azure_claims(roles: &[&str]) -> Claims {
        Claims::builder("svc")
            .roles(roles.iter().map(|s| s.to_string()).collect())
            .build()
    }

    fn keycloak_claims(roles: &[&str]) -> Claims {
        Claims::builder("svc")
            .realm_roles(roles.iter().map(|s| s.to_string()).collect())
            .build()
    }

    #[test]
    fn test_azure_drops_unrecognized_and_dedups() {
        let claims = azure_claims(&["artifact-admin", "bogus", "artifact_user"]);
        let set = IdpType::Azure.normalize(&claims);

        assert_eq!(set.as_slice(), &[Role::Admin, Role::User]);
    }

    #[test]
    fn test_azure_underscore_variant_dedups_against_hyphenated() {
        let claims = azure_claims(&["artifact_admin", "artifact-admin"]);
        let set = IdpType::Azure.normalize(&claims);

        assert_eq!(set.as_slice(), &[Role::Admin]);
    }

    #[test]
    fn test_azure_idempotent_on_canonical_input() {
        let claims = azure_claims(&["artifact-admin", "artifact-user", "artifact-readonly"]);
        let set = IdpType::Azure.normalize(&claims);

        assert_eq!(set.as_slice(), &[Role::Admin, Role::User, Role::ReadOnly]);
    }

    #[test]
    fn test_azure_empty_claim_is_empty_set() {
        let set = IdpType::Azure.normalize(&azure_claims(&[]));
        assert!(set.is_empty());
    }

    #[test]
    fn test_keycloak_reads_realm_access() {
        let claims = keycloak_claims(&["artifact-readonly", "offline_access", "uma_authorization"]);
        let set = IdpType::Keycloak.normalize(&claims);

        assert_eq!(set.as_slice(), &[Role::ReadOnly]);
    }

    #[test]
    fn test_keycloak_rejects_underscore_variants() {
        let claims = keycloak_claims(&["artifact_admin", "artifact_user"]);
        let set = IdpType::Keycloak.normalize(&claims);

        assert!(set.is_empty());
    }

    #[test]
    fn test_keycloak_missing_realm_access_is_empty_set() {
        let claims = Claims::builder("svc").build();
        let set = IdpType::Keycloak.normalize(&claims);

        assert!(set.is_empty());
    }

    #[test]
    fn test_keycloak_ignores_flat_roles_claim() {
        // Flat roles are the Azure shape; Keycloak normalization must not
        // read them even when present.
        let claims = Claims::builder("svc")
            .roles(vec!["artifact-admin".to_string()])
            .build();

        assert!(IdpType::Keycloak.normalize(&claims).is_empty());
    }

    #[test]
    fn test_default_is_keycloak() {
        assert_eq!(IdpType::default(), IdpType::Keycloak);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("azure".parse::<IdpType>().unwrap(), IdpType::Azure);
        assert_eq!("keycloak".parse::<IdpType>().unwrap(), IdpType::Keycloak);
        assert!("okta".parse::<IdpType>().is_err());
    }
}
