//! Role service configuration.
//!
//! Configuration is loaded from environment variables with defaults suitable
//! for a single-node deployment.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Role service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleServiceConfig {
    /// How long a cached name-to-ID lookup may be served without being
    /// refreshed from the store.
    pub name_cache_ttl: Duration,

    /// Commit attempts before a write gives up with a concurrent
    /// modification error.
    pub max_commit_attempts: u32,

    /// Whether persisted rule sets are stored minimized.
    ///
    /// A minimized rule set resolves every path the same way but drops
    /// explicit grants that are implied by an ancestor. Later dominance
    /// checks against the stored role then no longer see those grants, so
    /// this is off unless a deployment asks for compact rule sets.
    pub minimize_rules: bool,
}

impl Default for RoleServiceConfig {
    fn default() -> Self {
        Self {
            name_cache_ttl: Duration::from_secs(30),
            max_commit_attempts: 5,
            minimize_rules: false,
        }
    }
}

impl RoleServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PKI_ROLES_NAME_CACHE_TTL_SECS`: Name cache staleness window (default: 30)
    /// - `PKI_ROLES_MAX_COMMIT_ATTEMPTS`: Commit attempts per write (default: 5)
    /// - `PKI_ROLES_MINIMIZE_RULES`: Store minimized rule sets (default: false)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            name_cache_ttl: std::env::var("PKI_ROLES_NAME_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.name_cache_ttl),
            max_commit_attempts: std::env::var("PKI_ROLES_MAX_COMMIT_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_commit_attempts),
            minimize_rules: std::env::var("PKI_ROLES_MINIMIZE_RULES")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default.minimize_rules),
        }
    }

    /// Set the name cache staleness window.
    pub fn with_name_cache_ttl(mut self, ttl: Duration) -> Self {
        self.name_cache_ttl = ttl;
        self
    }

    /// Set the commit attempts per write.
    pub fn with_max_commit_attempts(mut self, attempts: u32) -> Self {
        self.max_commit_attempts = attempts;
        self
    }

    /// Enable or disable rule minimization.
    pub fn with_minimize_rules(mut self, minimize: bool) -> Self {
        self.minimize_rules = minimize;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_commit_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_commit_attempts".to_string(),
                message: "at least one commit attempt is required".to_string(),
            });
        }
        Ok(())
    }
}
