//! Access evaluation over a store snapshot
//!
//! Binds a token to the roles whose members select it, combines those
//! roles into an [`AccessTree`] and derives the namespaces the token may see.

use pki_auth::AuthenticationToken;
use pki_rules::{dominates, standard, AccessTree};
use std::collections::BTreeSet;

use crate::model::GLOBAL_NAMESPACE;
use crate::store::{StoreSnapshot, StoredRole};

/// Roles with at least one member selecting `token`.
pub fn roles_for<'a>(snapshot: &'a StoreSnapshot, token: &AuthenticationToken) -> Vec<&'a StoredRole> {
    snapshot
        .roles()
        .filter(|stored| match stored.role.id {
            Some(id) => snapshot.members(id).any(|member| member.matches(token)),
            None => false,
        })
        .collect()
}

/// Combined access of every role `token` belongs to.
pub fn access_tree(snapshot: &StoreSnapshot, token: &AuthenticationToken) -> AccessTree {
    tree_of(&roles_for(snapshot, token))
}

pub(crate) fn tree_of(roles: &[&StoredRole]) -> AccessTree {
    roles.iter().map(|stored| stored.role.rules.clone()).collect()
}

/// Namespaces whose roles `token` may see.
///
/// Always includes the namespaces of the token's own roles. Membership of a
/// global role widens the set to every namespace whose trust anchor access
/// resource one of the token's roles allows, or to every known namespace
/// when one of those roles holds full authority. Each role is consulted on
/// its own, so another role's deny never hides a namespace: adding a member
/// or an allow rule can only grow the set.
pub fn authorized_namespaces(snapshot: &StoreSnapshot, token: &AuthenticationToken) -> BTreeSet<String> {
    let roles = roles_for(snapshot, token);
    let mut visible: BTreeSet<String> = roles
        .iter()
        .map(|stored| stored.role.namespace.clone())
        .collect();
    if !visible.contains(GLOBAL_NAMESPACE) {
        return visible;
    }

    let trees: Vec<AccessTree> = roles
        .iter()
        .map(|stored| AccessTree::from_rule_sets([stored.role.rules.clone()]))
        .collect();

    let superadmin = standard::superadmin_rules();
    if trees.iter().any(|tree| dominates(tree, &superadmin)) {
        visible.extend(snapshot.namespaces());
        return visible;
    }

    for namespace in snapshot.namespaces() {
        if visible.contains(&namespace) {
            continue;
        }
        let resource = standard::ca_access(&namespace);
        if trees.iter().any(|tree| tree.is_allowed(&resource)) {
            visible.insert(namespace);
        }
    }
    visible
}
