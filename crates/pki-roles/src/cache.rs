//! Role name cache
//!
//! Maps `(namespace, name)` to a role ID for at most a configured staleness
//! window. The cache is advisory: a hit is always verified against the
//! current snapshot before it is used, and committed writes invalidate the
//! entries of the roles they touch.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::model::RoleId;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    role_id: RoleId,
    inserted_at: Instant,
}

/// Name-to-ID cache with bounded staleness.
#[derive(Debug)]
pub struct RoleNameCache {
    ttl: Duration,
    entries: RwLock<HashMap<(String, String), CacheEntry>>,
}

impl RoleNameCache {
    /// Create a cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a name; expired entries are treated as absent.
    pub async fn get(&self, namespace: &str, name: &str) -> Option<RoleId> {
        let key = (namespace.to_string(), name.to_string());
        let entries = self.entries.read().await;
        entries
            .get(&key)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.role_id)
    }

    /// Remember a name.
    pub async fn insert(&self, namespace: &str, name: &str, role_id: RoleId) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.write().await.insert(
            (namespace.to_string(), name.to_string()),
            CacheEntry {
                role_id,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Forget a name.
    pub async fn invalidate(&self, namespace: &str, name: &str) {
        self.entries
            .write()
            .await
            .remove(&(namespace.to_string(), name.to_string()));
    }

    /// Forget every name pointing at a role.
    pub async fn invalidate_role(&self, role_id: RoleId) {
        self.entries
            .write()
            .await
            .retain(|_, entry| entry.role_id != role_id);
    }

    /// Number of entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
