//! Shared fixture for the role service integration tests.

#![allow(dead_code)]

use pki_auth::{AuthenticationToken, MatchCriteria, MatchKey, MatchOperator};
use pki_roles::{MemoryRoleStore, Role, RoleId, RoleMember, RoleService, RoleStore, WriteOp, WriteSet};
use pki_rules::{standard, RuleSet};
use std::sync::Arc;

/// Trust anchor every test administrator is issued by.
pub const ANCHOR: &str = "ManagementCA";

/// Certificate token with the given common name.
pub fn token(cn: &str) -> AuthenticationToken {
    AuthenticationToken::certificate(ANCHOR, &format!("CN={cn},O=Example,C=SE")).unwrap()
}

/// Criteria selecting the certificate token with the given common name.
pub fn cn(cn: &str) -> MatchCriteria {
    MatchCriteria::new(ANCHOR, MatchKey::CommonName, MatchOperator::Equals, cn)
}

/// Test fixture: a service over an in-memory store, plus direct store
/// access for seeding state without going through authorization.
pub struct TestFixture {
    /// Backing store.
    pub store: Arc<MemoryRoleStore>,
    /// Service under test.
    pub service: RoleService,
    /// Token holding the superadmin role, if initialized.
    pub admin: AuthenticationToken,
}

impl TestFixture {
    /// Empty store, no roles at all.
    pub fn empty() -> Self {
        let store = Arc::new(MemoryRoleStore::new());
        Self {
            service: RoleService::new(store.clone()),
            store,
            admin: token("SuperAdmin"),
        }
    }

    /// Store holding the superadmin role with `CN=SuperAdmin` as member.
    pub async fn new() -> Self {
        let fixture = Self::empty();
        fixture
            .service
            .initialize_superadmin("Super Administrator Role", cn("SuperAdmin"))
            .await
            .unwrap();
        fixture
    }

    /// Write a role and its members straight into the store.
    pub async fn seed(&self, namespace: &str, name: &str, rules: RuleSet, members: &[&str]) -> Role {
        let role_id = RoleId::new();
        let mut role = Role::new(namespace, name).with_rules(rules);
        role.id = Some(role_id);

        let mut writes = WriteSet::new().op(WriteOp::PutRole(role.clone()));
        for member in members {
            writes = writes.op(WriteOp::PutMember(RoleMember::new(role_id, cn(member))));
        }
        self.store.commit(writes).await.unwrap();
        role
    }

    /// Rules that let an administrator manage roles within `grants`.
    pub fn editor_rules(grants: RuleSet) -> RuleSet {
        let mut rules = grants;
        rules.insert(standard::ROLE_EDIT, pki_rules::Rule::allow_exact());
        rules.insert(standard::ROLE_VIEW, pki_rules::Rule::allow_exact());
        rules
    }
}
