//! Role storage
//!
//! The store holds roles and members as immutable snapshots. Readers take an
//! `Arc` of the current snapshot and never block writers; a writer submits a
//! [`WriteSet`] which the store validates and applies atomically, producing
//! the next snapshot.
//!
//! Every role carries a version: the revision of the last commit that
//! changed the role or one of its members. Revisions only grow, so a version
//! is never handed out twice, not even to a role re-created under a deleted
//! role's ID. A write set lists the versions it read; if any of them moved
//! before the commit, the whole write set is rejected with
//! [`StoreError::Conflict`] and the caller re-plans against the new state.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::model::{MemberId, Role, RoleId, RoleMember};

/// A role together with its version.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRole {
    /// The role, always with an ID
    pub role: Role,
    /// Revision of the last commit that touched the role or its members
    pub version: u64,
}

/// Point-in-time view of all roles and members.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    roles: BTreeMap<RoleId, StoredRole>,
    members: BTreeMap<RoleId, BTreeMap<MemberId, RoleMember>>,
    names: BTreeMap<(String, String), RoleId>,
    revision: u64,
}

impl StoreSnapshot {
    /// Get a role by ID.
    pub fn role(&self, id: RoleId) -> Option<&Role> {
        self.roles.get(&id).map(|stored| &stored.role)
    }

    /// Get the current version of a role, `None` if it does not exist.
    pub fn version(&self, id: RoleId) -> Option<u64> {
        self.roles.get(&id).map(|stored| stored.version)
    }

    /// Get a role by namespace and name.
    pub fn role_by_name(&self, namespace: &str, name: &str) -> Option<&Role> {
        self.names
            .get(&(namespace.to_string(), name.to_string()))
            .and_then(|id| self.role(*id))
    }

    /// Iterate over all roles in ID order.
    pub fn roles(&self) -> impl Iterator<Item = &StoredRole> {
        self.roles.values()
    }

    /// Number of live roles.
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    /// Iterate over the members of a role.
    pub fn members(&self, role_id: RoleId) -> impl Iterator<Item = &RoleMember> {
        self.members
            .get(&role_id)
            .into_iter()
            .flat_map(|members| members.values())
    }

    /// Get one member of a role.
    pub fn member(&self, role_id: RoleId, member_id: MemberId) -> Option<&RoleMember> {
        self.members
            .get(&role_id)
            .and_then(|members| members.get(&member_id))
    }

    /// Namespaces of all live roles.
    pub fn namespaces(&self) -> BTreeSet<String> {
        self.names.keys().map(|(namespace, _)| namespace.clone()).collect()
    }

    /// Number of commits that produced this snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn check_read(&self, role_id: RoleId, expected: Option<u64>) -> StoreResult<()> {
        if self.version(role_id) != expected {
            return Err(StoreError::Conflict(role_id));
        }
        Ok(())
    }

    fn stamp(&mut self, role_id: RoleId, version: u64) -> StoreResult<()> {
        let stored = self
            .roles
            .get_mut(&role_id)
            .ok_or(StoreError::MissingRole(role_id))?;
        stored.version = version;
        Ok(())
    }

    /// Apply one mutation as part of the commit producing `version`.
    fn apply(&mut self, op: WriteOp, version: u64) -> StoreResult<()> {
        match op {
            WriteOp::PutRole(role) => {
                let id = role.id.ok_or(StoreError::Unidentified)?;
                let key = (role.namespace.clone(), role.name.clone());
                if let Some(owner) = self.names.get(&key) {
                    if *owner != id {
                        return Err(StoreError::NameTaken {
                            namespace: role.namespace,
                            name: role.name,
                        });
                    }
                }

                if let Some(previous) = self.roles.get(&id) {
                    let old_key = (previous.role.namespace.clone(), previous.role.name.clone());
                    self.names.remove(&old_key);
                }
                self.names.insert(key, id);
                self.roles.insert(id, StoredRole { role, version });
            }
            WriteOp::DeleteRole(id) => {
                let stored = self.roles.remove(&id).ok_or(StoreError::MissingRole(id))?;
                self.names
                    .remove(&(stored.role.namespace, stored.role.name));
                self.members.remove(&id);
            }
            WriteOp::PutMember(member) => {
                let role_id = member.role_id;
                self.stamp(role_id, version)?;
                self.members
                    .entry(role_id)
                    .or_default()
                    .insert(member.id, member);
            }
            WriteOp::DeleteMember { role_id, member_id } => {
                self.stamp(role_id, version)?;
                if let Some(members) = self.members.get_mut(&role_id) {
                    members.remove(&member_id);
                    if members.is_empty() {
                        self.members.remove(&role_id);
                    }
                }
            }
        }
        Ok(())
    }
}

/// One mutation of a write set.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert or replace a role (the role must carry an ID)
    PutRole(Role),
    /// Remove a role and all of its members
    DeleteRole(RoleId),
    /// Insert or replace a member of an existing role
    PutMember(RoleMember),
    /// Remove a member of an existing role
    DeleteMember {
        /// Owning role
        role_id: RoleId,
        /// Member to remove
        member_id: MemberId,
    },
}

/// Mutations applied together, guarded by the role versions they depend on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteSet {
    /// Role versions read while planning (`None` = the role must not exist)
    pub reads: Vec<(RoleId, Option<u64>)>,
    /// Store revision the write requires, if it depends on the whole store
    pub revision: Option<u64>,
    /// Mutations in application order
    pub ops: Vec<WriteOp>,
}

impl WriteSet {
    /// Create an empty write set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a version the write depends on.
    pub fn read(mut self, role_id: RoleId, version: Option<u64>) -> Self {
        self.reads.push((role_id, version));
        self
    }

    /// Require the store to still be at `revision`.
    pub fn at_revision(mut self, revision: u64) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Append a mutation.
    pub fn op(mut self, op: WriteOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Check if the write set mutates nothing.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Storage backend for roles and members.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Get the current snapshot.
    async fn snapshot(&self) -> Arc<StoreSnapshot>;

    /// Validate and apply a write set atomically.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Conflict`] if a read version no longer holds
    /// - [`StoreError::RevisionMoved`] if the store left the required revision
    /// - [`StoreError::NameTaken`] if a role would collide with another
    /// - [`StoreError::MissingRole`] if a mutation targets a missing role
    ///
    /// On error nothing is applied.
    async fn commit(&self, writes: WriteSet) -> StoreResult<Arc<StoreSnapshot>>;
}

/// In-memory role store.
///
/// Suitable for single-process deployments and testing.
#[derive(Debug, Default)]
pub struct MemoryRoleStore {
    state: RwLock<Arc<StoreSnapshot>>,
}

impl MemoryRoleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn snapshot(&self) -> Arc<StoreSnapshot> {
        self.state.read().await.clone()
    }

    async fn commit(&self, writes: WriteSet) -> StoreResult<Arc<StoreSnapshot>> {
        let mut state = self.state.write().await;
        if let Some(expected) = writes.revision {
            if state.revision != expected {
                return Err(StoreError::RevisionMoved {
                    expected,
                    actual: state.revision,
                });
            }
        }
        for (role_id, expected) in &writes.reads {
            state.check_read(*role_id, *expected)?;
        }

        let mut next = StoreSnapshot::clone(&state);
        next.revision += 1;
        let version = next.revision;
        for op in writes.ops {
            next.apply(op, version)?;
        }

        let next = Arc::new(next);
        *state = next.clone();
        tracing::trace!(revision = next.revision, "Committed write set");
        Ok(next)
    }
}
