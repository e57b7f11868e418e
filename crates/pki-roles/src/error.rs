//! Error types for role management
//!
//! All write operations are all-or-nothing: whenever one of these errors is
//! returned the store is left unchanged.

use pki_auth::AuthError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::model::RoleId;

/// Role store error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A role read by the transaction changed before commit
    #[error("Role {0} was modified concurrently")]
    Conflict(RoleId),

    /// Another live role already has this namespace and name
    #[error("Role name '{name}' is already taken in namespace '{namespace}'")]
    NameTaken {
        /// Namespace of the collision.
        namespace: String,
        /// Colliding name.
        name: String,
    },

    /// The store moved past the revision a write required
    #[error("Store is at revision {actual}, write required revision {expected}")]
    RevisionMoved {
        /// Required revision.
        expected: u64,
        /// Current revision.
        actual: u64,
    },

    /// The role a write refers to does not exist
    #[error("Role {0} does not exist")]
    MissingRole(RoleId),

    /// A role without an ID was written
    #[error("Role has no ID")]
    Unidentified,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Role management error types.
#[derive(Debug, Error)]
pub enum RoleError {
    /// Namespace and name collide with a live role
    #[error("Role '{name}' already exists in namespace '{namespace}'")]
    RoleExists {
        /// Namespace of the collision.
        namespace: String,
        /// Colliding name.
        name: String,
    },

    /// The caller may not perform the change
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// An entity expected to exist does not
    #[error("Not found: {0}")]
    NotFound(String),

    /// Every commit attempt lost against a concurrent change
    #[error("Concurrent modification, giving up")]
    ConcurrentModification,

    /// Role fields are not acceptable
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Member criteria are not acceptable
    #[error("Invalid role member: {0}")]
    InvalidMember(#[from] AuthError),

    /// Service configuration is not acceptable
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for role management operations.
pub type RoleResult<T> = Result<T, RoleError>;

impl RoleError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RoleError::ConcurrentModification
                | RoleError::Store(StoreError::Conflict(_))
                | RoleError::Store(StoreError::RevisionMoved { .. })
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            RoleError::RoleExists { .. } => "ROLE_EXISTS",
            RoleError::AuthorizationDenied(_) => "AUTHORIZATION_DENIED",
            RoleError::NotFound(_) => "NOT_FOUND",
            RoleError::ConcurrentModification => "CONCURRENT_MODIFICATION",
            RoleError::InvalidRole(_) => "INVALID_ROLE",
            RoleError::InvalidMember(_) => "INVALID_MEMBER",
            RoleError::Config(_) => "CONFIG_ERROR",
            RoleError::Store(_) => "STORE_ERROR",
        }
    }
}
