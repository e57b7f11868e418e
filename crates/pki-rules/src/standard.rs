//! # Reserved Resources
//!
//! Resource paths the authorization core itself relies on. How all other
//! paths are allocated to features is up to the caller.

use crate::path::ResourcePath;
use crate::rule::Rule;
use crate::ruleset::RuleSet;

/// The root-management resource. Holding a subtree allow here is full
/// administrative authority.
pub const ROOT: &str = "/";

/// Base of the per-trust-anchor access resources (`/ca/<id>`).
pub const CA_ACCESS_BASE: &str = "/ca";

/// Required to create, edit or delete roles and their members.
pub const ROLE_EDIT: &str = "/system_functionality/edit_administrator_privileges";

/// Checked by front-ends before listing roles.
pub const ROLE_VIEW: &str = "/system_functionality/view_administrator_privileges";

/// Access resource for a trust anchor (issuing CA).
///
/// # Example
///
/// ```
/// use pki_rules::standard;
///
/// assert_eq!(standard::ca_access("ManagementCA").as_str(), "/ca/ManagementCA");
/// ```
pub fn ca_access(trust_anchor_id: &str) -> ResourcePath {
    ResourcePath::new(CA_ACCESS_BASE).join(trust_anchor_id)
}

/// The rule set that defines full authority: a subtree allow on the root.
pub fn superadmin_rules() -> RuleSet {
    RuleSet::new().with_rule(ROOT, Rule::allow_subtree())
}
