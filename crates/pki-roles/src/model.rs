//! Role domain models
//!
//! This module provides the administrator role and the role member, the
//! selector that binds authentication tokens to a role.

use chrono::{DateTime, Utc};
use pki_auth::{AuthenticationToken, MatchCriteria};
use pki_rules::{ResourcePath, Rule, RuleSet};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Namespace of roles that are not bound to a tenant.
pub const GLOBAL_NAMESPACE: &str = "";

/// Opaque role identifier.
///
/// Assigned once when a role is created and never changed by renames or
/// namespace moves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Generate a new identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Administrator role.
///
/// A role is a named rule set within a namespace. The empty namespace is the
/// global one; every other namespace is a tenant.
///
/// # Examples
///
/// ```
/// use pki_roles::Role;
/// use pki_rules::{ResourcePath, Rule};
///
/// let role = Role::new("", "CA Administrators")
///     .with_rule("/ca", Rule::allow_subtree())
///     .with_rule("/ca/Root", Rule::deny_exact());
///
/// assert!(role.id.is_none());
/// assert!(role.is_global());
/// assert!(role.rules.is_allowed(&ResourcePath::new("/ca/Sub")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Role ID, `None` until the role has been persisted
    pub id: Option<RoleId>,

    /// Namespace ("" for global)
    #[serde(default)]
    pub namespace: String,

    /// Role name, unique within the namespace
    pub name: String,

    /// Access rules
    #[serde(default)]
    pub rules: RuleSet,

    /// When the role was created
    pub created_at: DateTime<Utc>,

    /// When the role was last persisted
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Creates a new, not yet persisted role without rules.
    ///
    /// # Arguments
    ///
    /// * `namespace` - Namespace of the role, "" for global
    /// * `name` - Role name
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            namespace: namespace.into(),
            name: name.into(),
            rules: RuleSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the rule set.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Add or replace one rule.
    pub fn with_rule(mut self, path: impl Into<ResourcePath>, rule: Rule) -> Self {
        self.rules.insert(path, rule);
        self
    }

    /// Move the role to another namespace and/or name.
    pub fn renamed(mut self, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self.name = name.into();
        self
    }

    /// Check if this role lives in the global namespace.
    pub fn is_global(&self) -> bool {
        self.namespace == GLOBAL_NAMESPACE
    }

    /// Name qualified by its namespace, for logs and messages.
    pub fn qualified_name(&self) -> String {
        if self.is_global() {
            self.name.clone()
        } else {
            format!("{}:{}", self.namespace, self.name)
        }
    }
}

/// Identity of a role member.
///
/// Derived from the owning role and the member's criteria, excluding the
/// operator, so the same selector added twice has the same identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct MemberId(Uuid);

impl MemberId {
    /// Derive the identity of a member of `role_id` selecting with `criteria`.
    ///
    /// SHA-256 over the length-prefixed fields, truncated to 128 bits.
    pub fn derive(role_id: RoleId, criteria: &MatchCriteria) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(role_id.as_uuid().as_bytes());
        for field in [
            criteria.token_type.as_str(),
            criteria.trust_anchor_id.as_str(),
            criteria.match_key.as_str(),
            criteria.value.as_str(),
        ] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field.as_bytes());
        }
        let digest = hasher.finalize();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self(Uuid::from_bytes(bytes))
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role member: selects the authentication tokens that hold a role.
///
/// # Examples
///
/// ```
/// use pki_auth::{AuthenticationToken, MatchCriteria, MatchKey, MatchOperator};
/// use pki_roles::{RoleId, RoleMember};
///
/// let role_id = RoleId::new();
/// let member = RoleMember::new(
///     role_id,
///     MatchCriteria::new("ManagementCA", MatchKey::CommonName, MatchOperator::Equals, "SuperAdmin"),
/// );
///
/// let token = AuthenticationToken::certificate("ManagementCA", "CN=SuperAdmin").unwrap();
/// assert!(member.matches(&token));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMember {
    /// Derived member identity
    pub id: MemberId,

    /// Owning role
    pub role_id: RoleId,

    /// Token selector
    #[serde(flatten)]
    pub criteria: MatchCriteria,

    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
}

impl RoleMember {
    /// Creates a member of `role_id` selecting tokens with `criteria`.
    pub fn new(role_id: RoleId, criteria: MatchCriteria) -> Self {
        Self {
            id: MemberId::derive(role_id, &criteria),
            role_id,
            criteria,
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if a token is selected by this member.
    pub fn matches(&self, token: &AuthenticationToken) -> bool {
        self.criteria.matches(token)
    }

    /// Copy of this member with its identity re-derived from its fields.
    pub(crate) fn normalized(&self) -> Self {
        Self {
            id: MemberId::derive(self.role_id, &self.criteria),
            ..self.clone()
        }
    }
}
