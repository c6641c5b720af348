//! Canonical roles and the normalized per-request role set.

use serde::Serialize;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// Role
// ═══════════════════════════════════════════════════════════════════════════════

/// A canonical capability tag recognized by the authorization policy.
///
/// Identity providers deliver roles as raw tags (`artifact-admin`,
/// `artifact_user`, ...). Normalization maps the recognized tags onto this
/// closed set and drops everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    ReadOnly,
}

impl Role {
    /// The canonical string form used in logs and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::ReadOnly => "readonly",
        }
    }

    /// The hyphenated tag this role is delivered as by identity providers.
    pub fn raw_tag(&self) -> &'static str {
        match self {
            Self::Admin => "artifact-admin",
            Self::User => "artifact-user",
            Self::ReadOnly => "artifact-readonly",
        }
    }

    /// Map a hyphenated provider tag onto a canonical role.
    ///
    /// Returns `None` for anything outside the recognized set; unrecognized
    /// tags are dropped by the callers, never treated as an error.
    pub fn from_raw_tag(tag: &str) -> Option<Self> {
        match tag {
            "artifact-admin" => Some(Self::Admin),
            "artifact-user" => Some(Self::User),
            "artifact-readonly" => Some(Self::ReadOnly),
            _ => None,
        }
    }

    /// All canonical roles.
    pub fn all() -> [Role; 3] {
        [Self::Admin, Self::User, Self::ReadOnly]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RoleSet
// ═══════════════════════════════════════════════════════════════════════════════

/// An ordered, duplicate-free set of canonical roles.
///
/// Derived once per request from the caller's verified claims and immutable
/// for the request's duration. Insertion preserves first-seen order, which
/// keeps normalization deterministic and testable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    /// Create an empty role set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a role, keeping first-seen order. Returns `false` on duplicates.
    pub fn insert(&mut self, role: Role) -> bool {
        if self.0.contains(&role) {
            return false;
        }
        self.0.push(role);
        true
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Whether this set shares at least one role with `roles`.
    pub fn intersects(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.contains(*r))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Role] {
        &self.0
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = Self::new();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|r| r.as_str()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
