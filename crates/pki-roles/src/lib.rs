//! # PKI Administrator Roles
//!
//! This crate provides administrator roles for CA administration: named rule
//! sets bound to authentication tokens through role members, and the service
//! that manages them without allowing privilege escalation.
//!
//! ## Overview
//!
//! The pki-roles crate handles:
//! - **Roles**: Namespaced rule sets with stable IDs
//! - **Members**: Token selectors with derived, idempotent identities
//! - **Authorization**: Access decisions across every role a token holds
//! - **Role management**: Create, persist, delete and member changes, each
//!   guarded by a dominance check against the editor's own access
//! - **Namespaces**: Which tenant namespaces a token may see
//! - **Store**: Snapshot reads and optimistic, atomic writes
//!
//! ## Architecture
//!
//! ```text
//! AuthenticationToken
//!   └─ RoleMember (matches) ─→ Role ─→ RuleSet
//!                                         └─ AccessTree (all roles of the token)
//!                                               ├─ is_authorized
//!                                               └─ dominance ─→ RoleService writes
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pki_auth::{AuthenticationToken, MatchCriteria, MatchKey, MatchOperator};
//! use pki_roles::{Role, RoleMember, RoleService};
//! use pki_rules::Rule;
//!
//! async fn example() -> Result<(), pki_roles::RoleError> {
//!     let service = RoleService::in_memory();
//!     service
//!         .initialize_superadmin(
//!             "Super Administrator Role",
//!             MatchCriteria::new("ManagementCA", MatchKey::CommonName, MatchOperator::Equals, "SuperAdmin"),
//!         )
//!         .await?;
//!     let admin = AuthenticationToken::certificate("ManagementCA", "CN=SuperAdmin").unwrap();
//!
//!     // A role that may operate one CA
//!     let role = service
//!         .persist_role(&admin, Role::new("", "Operators").with_rule("/ca/IssuingCA", Rule::allow_subtree()))
//!         .await?;
//!
//!     // Everyone from ManagementCA in the Operations unit holds it
//!     let criteria = MatchCriteria::new(
//!         "ManagementCA",
//!         MatchKey::OrganizationalUnit,
//!         MatchOperator::Equals,
//!         "Operations",
//!     );
//!     service.add_member(&admin, RoleMember::new(role.id.unwrap(), criteria)).await?;
//!
//!     let operator = AuthenticationToken::certificate("ManagementCA", "CN=Op1,OU=Operations").unwrap();
//!     assert!(service.is_authorized(&operator, "/ca/IssuingCA").await);
//!     assert!(!service.is_authorized(&operator, "/ca/RootCA").await);
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod service;
pub mod store;

// Re-export main types for convenience
pub use cache::RoleNameCache;
pub use config::{ConfigError, RoleServiceConfig};
pub use error::{RoleError, RoleResult, StoreError, StoreResult};
pub use model::{MemberId, Role, RoleId, RoleMember, GLOBAL_NAMESPACE};
pub use service::RoleService;
pub use store::{MemoryRoleStore, RoleStore, StoreSnapshot, StoredRole, WriteOp, WriteSet};
