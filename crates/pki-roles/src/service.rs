//! Role management service
//!
//! The service is stateless apart from its name cache: every operation runs
//! against a store snapshot. Reads use one snapshot. Writes plan against a
//! snapshot, authorize against the same snapshot and commit a write set that
//! records the versions of the target role and of every role the editor
//! holds; if any of those changed in the meantime the write is re-planned
//! against the latest state.
//!
//! Every write requires the editor to be allowed [`standard::ROLE_EDIT`] and
//! to dominate the rules of the role it touches. Denied writes are audited
//! and always surfaced, never retried.

use chrono::Utc;
use pki_auth::{AuthenticationToken, MatchCriteria, TokenType};
use pki_events::{EventBus, RoleEvent};
use pki_rules::{check_dominance, dominates, standard, AccessTree, ResourcePath, RuleSet};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::access::{self, tree_of};
use crate::cache::RoleNameCache;
use crate::config::RoleServiceConfig;
use crate::error::{RoleError, RoleResult, StoreError};
use crate::model::{MemberId, Role, RoleId, RoleMember, GLOBAL_NAMESPACE};
use crate::store::{MemoryRoleStore, RoleStore, StoreSnapshot, StoredRole, WriteOp, WriteSet};

/// Outcome of planning a write against one snapshot.
struct Plan<T> {
    writes: WriteSet,
    output: T,
    events: Vec<RoleEvent>,
}

impl<T> Plan<T> {
    fn noop(output: T) -> Self {
        Self {
            writes: WriteSet::new(),
            output,
            events: Vec::new(),
        }
    }
}

/// The roles an editor holds in one snapshot.
struct Editor<'a> {
    token: &'a AuthenticationToken,
    roles: Vec<&'a StoredRole>,
    tree: AccessTree,
}

impl<'a> Editor<'a> {
    fn of(snapshot: &'a StoreSnapshot, token: &'a AuthenticationToken) -> Self {
        let roles = access::roles_for(snapshot, token);
        let tree = tree_of(&roles);
        Self { token, roles, tree }
    }

    fn require_access(&self, resource: &ResourcePath) -> RoleResult<()> {
        if self.tree.is_allowed(resource) {
            return Ok(());
        }
        Err(RoleError::AuthorizationDenied(format!(
            "{} is not authorized to {}",
            self.token, resource
        )))
    }

    fn require_dominance(&self, role_name: &str, rules: &RuleSet) -> RoleResult<()> {
        check_dominance(&self.tree, rules).map_err(|violation| {
            RoleError::AuthorizationDenied(format!(
                "{} may not edit role '{}': {}",
                self.token, role_name, violation
            ))
        })
    }

    /// Guard `writes` with the versions of the editor's roles.
    fn guard(&self, mut writes: WriteSet) -> WriteSet {
        for stored in &self.roles {
            if let Some(id) = stored.role.id {
                writes = writes.read(id, Some(stored.version));
            }
        }
        writes
    }
}

/// Administrator role management.
///
/// # Examples
///
/// ```rust,no_run
/// use pki_auth::{AuthenticationToken, MatchCriteria, MatchKey, MatchOperator};
/// use pki_roles::RoleService;
///
/// async fn example() -> Result<(), pki_roles::RoleError> {
///     let service = RoleService::in_memory();
///     service
///         .initialize_superadmin(
///             "Super Administrator Role",
///             MatchCriteria::new("ManagementCA", MatchKey::CommonName, MatchOperator::Equals, "SuperAdmin"),
///         )
///         .await?;
///
///     let admin = AuthenticationToken::certificate("ManagementCA", "CN=SuperAdmin").unwrap();
///     let role = service.create_role(&admin, "", "Auditors").await?;
///     assert!(service.get_role(role.id.unwrap()).await.is_some());
///     Ok(())
/// }
/// ```
pub struct RoleService {
    store: Arc<dyn RoleStore>,
    config: RoleServiceConfig,
    name_cache: RoleNameCache,
    events: Option<Arc<dyn EventBus>>,
}

impl std::fmt::Debug for RoleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleService")
            .field("config", &self.config)
            .field("audited", &self.events.is_some())
            .finish()
    }
}

impl RoleService {
    /// Create a service over `store` with the default configuration.
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        let config = RoleServiceConfig::default();
        Self {
            store,
            name_cache: RoleNameCache::new(config.name_cache_ttl),
            config,
            events: None,
        }
    }

    /// Create a service over an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryRoleStore::new()))
    }

    /// Create a service with an explicit configuration.
    ///
    /// # Errors
    ///
    /// [`RoleError::Config`] if the configuration does not validate.
    pub fn with_config(store: Arc<dyn RoleStore>, config: RoleServiceConfig) -> RoleResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            name_cache: RoleNameCache::new(config.name_cache_ttl),
            config,
            events: None,
        })
    }

    /// Publish audit events to `bus`.
    pub fn with_event_bus(mut self, bus: Arc<dyn EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &RoleServiceConfig {
        &self.config
    }

    /// Get the name cache.
    pub fn name_cache(&self) -> &RoleNameCache {
        &self.name_cache
    }

    // ========================================================================
    // Authorization
    // ========================================================================

    /// Check if `token` is allowed `resource`.
    ///
    /// Never fails: a token without roles, or a resource no role has an
    /// opinion on, is denied.
    #[instrument(skip(self, token, resource), fields(actor = %token))]
    pub async fn is_authorized(&self, token: &AuthenticationToken, resource: impl Into<ResourcePath>) -> bool {
        let resource = resource.into();
        let snapshot = self.store.snapshot().await;
        let resolution = access::access_tree(&snapshot, token).resolve(&resource);
        debug!(
            resource = %resource,
            allowed = resolution.is_allow(),
            source = ?resolution.source.as_ref().map(ResourcePath::as_str),
            "Access decision"
        );
        resolution.is_allow()
    }

    /// Check if `token` dominates `role`: it holds every grant of the given
    /// rules and, if the role already exists, of its stored rules too.
    ///
    /// This is the dominance check alone. Writes additionally require
    /// [`standard::ROLE_EDIT`].
    #[instrument(skip(self, token, role), fields(actor = %token, role = %role.qualified_name()))]
    pub async fn is_authorized_to_edit_role(&self, token: &AuthenticationToken, role: &Role) -> bool {
        let snapshot = self.store.snapshot().await;
        let editor = Editor::of(&snapshot, token);
        let authorized = dominates(&editor.tree, &role.rules)
            && role
                .id
                .and_then(|id| snapshot.role(id))
                .map_or(true, |current| dominates(&editor.tree, &current.rules));
        debug!(authorized, "Role edit decision");
        authorized
    }

    /// Every role `token` dominates, its own roles included.
    ///
    /// Sorted by namespace and name. Front-ends gate role listing on
    /// [`standard::ROLE_VIEW`] before calling this.
    #[instrument(skip(self, token), fields(actor = %token))]
    pub async fn get_authorized_roles(&self, token: &AuthenticationToken) -> Vec<Role> {
        let snapshot = self.store.snapshot().await;
        let editor = Editor::of(&snapshot, token);
        let mut roles: Vec<Role> = snapshot
            .roles()
            .filter(|stored| dominates(&editor.tree, &stored.role.rules))
            .map(|stored| stored.role.clone())
            .collect();
        roles.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
        roles
    }

    /// Namespaces `token` may see. See [`access::authorized_namespaces`].
    #[instrument(skip(self, token), fields(actor = %token))]
    pub async fn get_authorized_namespaces(&self, token: &AuthenticationToken) -> BTreeSet<String> {
        let snapshot = self.store.snapshot().await;
        access::authorized_namespaces(&snapshot, token)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get a role by ID.
    pub async fn get_role(&self, role_id: RoleId) -> Option<Role> {
        self.store.snapshot().await.role(role_id).cloned()
    }

    /// Get a role by namespace and name.
    ///
    /// Served through the name cache; a cached ID is verified against the
    /// current snapshot before use.
    pub async fn get_role_by_name(&self, namespace: &str, name: &str) -> Option<Role> {
        let snapshot = self.store.snapshot().await;
        if let Some(role_id) = self.name_cache.get(namespace, name).await {
            if let Some(role) = snapshot.role(role_id) {
                if role.namespace == namespace && role.name == name {
                    return Some(role.clone());
                }
            }
            self.name_cache.invalidate(namespace, name).await;
        }

        let role = snapshot.role_by_name(namespace, name)?.clone();
        if let Some(role_id) = role.id {
            self.name_cache.insert(namespace, name, role_id).await;
        }
        Some(role)
    }

    /// Members of a role, empty if the role does not exist.
    pub async fn get_role_members(&self, role_id: RoleId) -> Vec<RoleMember> {
        self.store
            .snapshot()
            .await
            .members(role_id)
            .cloned()
            .collect()
    }

    /// Roles with a member selecting `token`.
    pub async fn get_roles_token_is_member_of(&self, token: &AuthenticationToken) -> Vec<Role> {
        let snapshot = self.store.snapshot().await;
        access::roles_for(&snapshot, token)
            .into_iter()
            .map(|stored| stored.role.clone())
            .collect()
    }

    // ========================================================================
    // Role writes
    // ========================================================================

    /// Create an empty role.
    ///
    /// # Errors
    ///
    /// - [`RoleError::RoleExists`] if the namespace already has a role of
    ///   that name
    /// - [`RoleError::AuthorizationDenied`] if `token` may not edit roles
    pub async fn create_role(&self, token: &AuthenticationToken, namespace: &str, name: &str) -> RoleResult<Role> {
        self.persist_role(token, Role::new(namespace, name)).await
    }

    /// Create or fully replace a role.
    ///
    /// A role without an ID is created. A role with an ID replaces the
    /// stored role of that ID (name, namespace and rules), or is created
    /// under that ID if none exists. A role re-created under a deleted ID
    /// gets a fresh version, so writes planned against the deleted role
    /// conflict. The editor must dominate the new rules
    /// and, when replacing, the stored rules.
    ///
    /// # Returns
    ///
    /// The role as stored.
    ///
    /// # Errors
    ///
    /// - [`RoleError::InvalidRole`] for an empty name
    /// - [`RoleError::RoleExists`] if another role has the namespace and name
    /// - [`RoleError::AuthorizationDenied`] if the editor does not dominate
    /// - [`RoleError::ConcurrentModification`] if every commit attempt conflicted
    #[instrument(skip(self, token, role), fields(actor = %token, role = %role.qualified_name()))]
    pub async fn persist_role(&self, token: &AuthenticationToken, role: Role) -> RoleResult<Role> {
        if role.name.trim().is_empty() {
            return Err(RoleError::InvalidRole("role name must not be empty".to_string()));
        }
        let role_id = role.id.unwrap_or_default();
        let stored_rules = if self.config.minimize_rules {
            role.rules.minimized()
        } else {
            role.rules.clone()
        };
        let role_edit = ResourcePath::new(standard::ROLE_EDIT);

        let persisted = self
            .transact(token, "persist_role", role.id, |snapshot| {
                let editor = Editor::of(snapshot, token);
                editor.require_access(&role_edit)?;
                editor.require_dominance(&role.qualified_name(), &role.rules)?;

                if let Some(other) = snapshot.role_by_name(&role.namespace, &role.name) {
                    if other.id != Some(role_id) {
                        return Err(RoleError::RoleExists {
                            namespace: role.namespace.clone(),
                            name: role.name.clone(),
                        });
                    }
                }

                let mut next = role.clone();
                next.id = Some(role_id);
                next.rules = stored_rules.clone();
                next.updated_at = Utc::now();

                let mut events = Vec::new();
                match snapshot.role(role_id) {
                    Some(current) => {
                        editor.require_dominance(&current.qualified_name(), &current.rules)?;
                        next.created_at = current.created_at;
                        if current.namespace != next.namespace || current.name != next.name {
                            events.push(RoleEvent::Renamed {
                                role_id: role_id.as_uuid(),
                                old_namespace: current.namespace.clone(),
                                old_name: current.name.clone(),
                                namespace: next.namespace.clone(),
                                name: next.name.clone(),
                            });
                        }
                        events.push(RoleEvent::Persisted {
                            role_id: role_id.as_uuid(),
                            namespace: next.namespace.clone(),
                            name: next.name.clone(),
                            rule_count: next.rules.len(),
                        });
                    }
                    None => events.push(RoleEvent::Created {
                        role_id: role_id.as_uuid(),
                        namespace: next.namespace.clone(),
                        name: next.name.clone(),
                    }),
                }

                let writes = editor.guard(
                    WriteSet::new()
                        .read(role_id, snapshot.version(role_id))
                        .op(WriteOp::PutRole(next.clone())),
                );
                Ok(Plan {
                    writes,
                    output: next,
                    events,
                })
            })
            .await?;

        self.name_cache.invalidate_role(role_id).await;
        self.name_cache
            .insert(&persisted.namespace, &persisted.name, role_id)
            .await;
        info!(role_id = %role_id, rules = persisted.rules.len(), "Persisted role");
        Ok(persisted)
    }

    /// Delete a role and all of its members.
    ///
    /// # Returns
    ///
    /// `true` if the role was removed, `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// [`RoleError::AuthorizationDenied`] if the editor does not dominate the
    /// stored role. A missing role is never an error.
    #[instrument(skip(self, token), fields(actor = %token))]
    pub async fn delete_role_idempotent(&self, token: &AuthenticationToken, role_id: RoleId) -> RoleResult<bool> {
        let role_edit = ResourcePath::new(standard::ROLE_EDIT);

        let deleted = self
            .transact(token, "delete_role", Some(role_id), |snapshot| {
                let Some(current) = snapshot.role(role_id) else {
                    return Ok(Plan::noop(None));
                };
                let editor = Editor::of(snapshot, token);
                editor.require_access(&role_edit)?;
                editor.require_dominance(&current.qualified_name(), &current.rules)?;

                let writes = editor.guard(
                    WriteSet::new()
                        .read(role_id, snapshot.version(role_id))
                        .op(WriteOp::DeleteRole(role_id)),
                );
                Ok(Plan {
                    writes,
                    output: Some(current.clone()),
                    events: vec![RoleEvent::Deleted {
                        role_id: role_id.as_uuid(),
                        namespace: current.namespace.clone(),
                        name: current.name.clone(),
                        members_removed: snapshot.members(role_id).count(),
                    }],
                })
            })
            .await?;

        self.name_cache.invalidate_role(role_id).await;
        match deleted {
            Some(role) => {
                info!(role_id = %role_id, role = %role.qualified_name(), "Deleted role");
                Ok(true)
            }
            None => {
                debug!(role_id = %role_id, "Role already absent");
                Ok(false)
            }
        }
    }

    // ========================================================================
    // Member writes
    // ========================================================================

    /// Add a member to its role, or update the member with the same identity.
    ///
    /// The member's identity is re-derived from its fields. Adding an
    /// identical member again changes nothing.
    ///
    /// Besides dominating the role, the editor must be allowed the access
    /// resource of the member's trust anchor when the member selects
    /// certificate tokens.
    ///
    /// # Errors
    ///
    /// - [`RoleError::InvalidMember`] if the criteria do not validate
    /// - [`RoleError::NotFound`] if the role does not exist
    /// - [`RoleError::AuthorizationDenied`] if the editor may not do this
    #[instrument(skip(self, token, member), fields(actor = %token, role_id = %member.role_id))]
    pub async fn add_member(&self, token: &AuthenticationToken, member: RoleMember) -> RoleResult<RoleMember> {
        member.criteria.validate()?;
        let member = member.normalized();
        let role_id = member.role_id;
        let role_edit = ResourcePath::new(standard::ROLE_EDIT);

        let (added, changed) = self
            .transact(token, "add_member", Some(role_id), |snapshot| {
                let role = snapshot
                    .role(role_id)
                    .ok_or_else(|| RoleError::NotFound(format!("role {}", role_id)))?;
                let editor = Editor::of(snapshot, token);
                editor.require_access(&role_edit)?;
                if member.criteria.token_type == TokenType::Certificate {
                    editor.require_access(&standard::ca_access(&member.criteria.trust_anchor_id))?;
                }
                editor.require_dominance(&role.qualified_name(), &role.rules)?;

                if snapshot.member(role_id, member.id) == Some(&member) {
                    return Ok(Plan::noop((member.clone(), false)));
                }
                let writes = editor.guard(
                    WriteSet::new()
                        .read(role_id, snapshot.version(role_id))
                        .op(WriteOp::PutMember(member.clone())),
                );
                Ok(Plan {
                    writes,
                    output: (member.clone(), true),
                    events: vec![RoleEvent::MemberAdded {
                        role_id: role_id.as_uuid(),
                        member_id: member.id.as_uuid(),
                        trust_anchor_id: member.criteria.trust_anchor_id.clone(),
                        match_key: member.criteria.match_key.to_string(),
                        match_value: member.criteria.value.clone(),
                    }],
                })
            })
            .await?;

        if changed {
            info!(member_id = %added.id, "Added role member");
        }
        Ok(added)
    }

    /// Convenience for [`RoleService::add_member`] from bare criteria.
    pub async fn add_member_criteria(
        &self,
        token: &AuthenticationToken,
        role_id: RoleId,
        criteria: MatchCriteria,
    ) -> RoleResult<RoleMember> {
        self.add_member(token, RoleMember::new(role_id, criteria)).await
    }

    /// Remove a member from a role.
    ///
    /// # Returns
    ///
    /// `true` if the member was removed, `false` if the role had no such
    /// member.
    ///
    /// # Errors
    ///
    /// - [`RoleError::NotFound`] if the role does not exist
    /// - [`RoleError::AuthorizationDenied`] if the editor does not dominate
    ///   the role
    #[instrument(skip(self, token), fields(actor = %token))]
    pub async fn remove_member(
        &self,
        token: &AuthenticationToken,
        role_id: RoleId,
        member_id: MemberId,
    ) -> RoleResult<bool> {
        let role_edit = ResourcePath::new(standard::ROLE_EDIT);

        let removed = self
            .transact(token, "remove_member", Some(role_id), |snapshot| {
                let role = snapshot
                    .role(role_id)
                    .ok_or_else(|| RoleError::NotFound(format!("role {}", role_id)))?;
                let editor = Editor::of(snapshot, token);
                editor.require_access(&role_edit)?;
                editor.require_dominance(&role.qualified_name(), &role.rules)?;

                if snapshot.member(role_id, member_id).is_none() {
                    return Ok(Plan::noop(false));
                }
                let writes = editor.guard(
                    WriteSet::new()
                        .read(role_id, snapshot.version(role_id))
                        .op(WriteOp::DeleteMember { role_id, member_id }),
                );
                Ok(Plan {
                    writes,
                    output: true,
                    events: vec![RoleEvent::MemberRemoved {
                        role_id: role_id.as_uuid(),
                        member_id: member_id.as_uuid(),
                    }],
                })
            })
            .await?;

        if removed {
            info!(member_id = %member_id, "Removed role member");
        }
        Ok(removed)
    }

    // ========================================================================
    // Bootstrap
    // ========================================================================

    /// Create the first role: full authority, with one member.
    ///
    /// Only possible while the store holds no roles at all; afterwards every
    /// role is created by an administrator through [`RoleService::persist_role`].
    ///
    /// # Errors
    ///
    /// - [`RoleError::InvalidMember`] if the criteria do not validate
    /// - [`RoleError::AuthorizationDenied`] if the store already holds roles
    #[instrument(skip(self, criteria))]
    pub async fn initialize_superadmin(&self, name: &str, criteria: MatchCriteria) -> RoleResult<Role> {
        criteria.validate()?;
        let role_id = RoleId::new();
        let mut role = Role::new(GLOBAL_NAMESPACE, name).with_rules(standard::superadmin_rules());
        role.id = Some(role_id);
        let member = RoleMember::new(role_id, criteria);

        let mut committed = false;
        for attempt in 1..=self.config.max_commit_attempts {
            let snapshot = self.store.snapshot().await;
            if snapshot.role_count() > 0 {
                warn!("Refusing to initialize a role store that already holds roles");
                return Err(RoleError::AuthorizationDenied(
                    "role store is already initialized".to_string(),
                ));
            }

            // any commit in between may have added a role
            let writes = WriteSet::new()
                .at_revision(snapshot.revision())
                .op(WriteOp::PutRole(role.clone()))
                .op(WriteOp::PutMember(member.clone()));
            match self.store.commit(writes).await {
                Ok(_) => {
                    committed = true;
                    break;
                }
                Err(StoreError::RevisionMoved { actual, .. }) => {
                    debug!(attempt, revision = actual, "Store moved during initialization, re-checking");
                }
                Err(e) => return Err(store_error(e)),
            }
        }
        if !committed {
            return Err(RoleError::ConcurrentModification);
        }

        info!(role_id = %role_id, member_id = %member.id, "Initialized superadmin role");
        self.publish(
            None,
            RoleEvent::Created {
                role_id: role_id.as_uuid(),
                namespace: role.namespace.clone(),
                name: role.name.clone(),
            },
        )
        .await;
        self.publish(
            None,
            RoleEvent::MemberAdded {
                role_id: role_id.as_uuid(),
                member_id: member.id.as_uuid(),
                trust_anchor_id: member.criteria.trust_anchor_id.clone(),
                match_key: member.criteria.match_key.to_string(),
                match_value: member.criteria.value.clone(),
            },
        )
        .await;
        Ok(role)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Plan and commit a write, re-planning on version conflicts.
    async fn transact<T, F>(
        &self,
        token: &AuthenticationToken,
        operation: &'static str,
        target: Option<RoleId>,
        mut plan: F,
    ) -> RoleResult<T>
    where
        F: FnMut(&StoreSnapshot) -> RoleResult<Plan<T>>,
    {
        for attempt in 1..=self.config.max_commit_attempts {
            let snapshot = self.store.snapshot().await;
            let planned = match plan(&snapshot) {
                Ok(planned) => planned,
                Err(RoleError::AuthorizationDenied(reason)) => {
                    warn!(operation, reason = %reason, "Role edit denied");
                    self.publish(
                        Some(token),
                        RoleEvent::AccessDenied {
                            operation: operation.to_string(),
                            role_id: target.map(|id| id.as_uuid()),
                            reason: reason.clone(),
                        },
                    )
                    .await;
                    return Err(RoleError::AuthorizationDenied(reason));
                }
                Err(e) => return Err(e),
            };

            if planned.writes.is_empty() {
                return Ok(planned.output);
            }

            match self.store.commit(planned.writes).await {
                Ok(_) => {
                    for event in planned.events {
                        self.publish(Some(token), event).await;
                    }
                    return Ok(planned.output);
                }
                Err(StoreError::Conflict(role_id)) => {
                    debug!(operation, attempt, role_id = %role_id, "Commit conflict, re-planning");
                }
                Err(e) => return Err(store_error(e)),
            }
        }

        warn!(
            operation,
            attempts = self.config.max_commit_attempts,
            "Giving up after repeated commit conflicts"
        );
        Err(RoleError::ConcurrentModification)
    }

    async fn publish(&self, actor: Option<&AuthenticationToken>, event: RoleEvent) {
        let Some(bus) = &self.events else {
            return;
        };
        let mut envelope = event.to_event();
        if let Some(token) = actor {
            envelope = envelope.with_actor(token.to_string());
        }
        if let Err(e) = bus.publish(envelope).await {
            warn!(error = %e, event_type = event.event_type(), "Failed to publish role audit event");
        }
    }
}

fn store_error(error: StoreError) -> RoleError {
    match error {
        StoreError::NameTaken { namespace, name } => RoleError::RoleExists { namespace, name },
        StoreError::MissingRole(role_id) => RoleError::NotFound(format!("role {}", role_id)),
        other => RoleError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pki_auth::{MatchKey, MatchOperator};

    fn superadmin_criteria() -> MatchCriteria {
        MatchCriteria::new("ManagementCA", MatchKey::CommonName, MatchOperator::Equals, "SuperAdmin")
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RoleServiceConfig::default().with_max_commit_attempts(0);
        let err = RoleService::with_config(Arc::new(MemoryRoleStore::new()), config).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[tokio::test]
    async fn test_initialize_only_once() {
        let service = RoleService::in_memory();
        let role = service
            .initialize_superadmin("Super Administrator Role", superadmin_criteria())
            .await
            .unwrap();
        assert_eq!(role.rules, standard::superadmin_rules());
        assert_eq!(service.get_role_members(role.id.unwrap()).await.len(), 1);

        let err = service
            .initialize_superadmin("Another", superadmin_criteria())
            .await
            .unwrap_err();
        assert!(matches!(err, RoleError::AuthorizationDenied(_)));
    }

    #[tokio::test]
    async fn test_initialize_after_concurrent_bootstrap_is_denied() {
        let store = Arc::new(MemoryRoleStore::new());
        let service = RoleService::new(store.clone());
        let other = RoleService::new(store.clone());

        let (first, second) = tokio::join!(
            service.initialize_superadmin("Super Administrator Role", superadmin_criteria()),
            other.initialize_superadmin("Shadow Administrators", superadmin_criteria()),
        );
        assert!(first.is_ok() != second.is_ok());
        assert_eq!(store.snapshot().await.role_count(), 1);
    }

    #[tokio::test]
    async fn test_token_without_roles_is_denied() {
        let service = RoleService::in_memory();
        service
            .initialize_superadmin("Super Administrator Role", superadmin_criteria())
            .await
            .unwrap();

        let stranger = AuthenticationToken::certificate("ManagementCA", "CN=Stranger").unwrap();
        assert!(!service.is_authorized(&stranger, "/").await);
        assert!(service.get_authorized_roles(&stranger).await.is_empty());
        assert!(service.get_authorized_namespaces(&stranger).await.is_empty());

        let err = service.create_role(&stranger, "", "Mine").await.unwrap_err();
        assert!(matches!(err, RoleError::AuthorizationDenied(_)));
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let service = RoleService::in_memory();
        let admin = AuthenticationToken::certificate("ManagementCA", "CN=SuperAdmin").unwrap();
        let err = service.create_role(&admin, "", "  ").await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ROLE");
    }
}
