//! Audit event types
//!
//! This module defines the audit events published when administrator roles
//! and role memberships change, and when a change is refused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Component that emitted an event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Role and role member management
    Roles,
}

impl EventSource {
    /// Get the string representation of the source.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Roles => "roles",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded in an audit event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The operation was committed
    Success,
    /// The operation was refused
    Failure,
}

/// Audit event envelope.
///
/// All events are wrapped in this envelope, which carries what routing and
/// the audit trail need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Event type (e.g., "role.created", "role.member_added")
    pub event_type: String,

    /// Emitting component
    pub source: EventSource,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,

    /// Administrator that performed the operation
    pub actor: Option<String>,

    /// Whether the operation was committed
    pub outcome: Outcome,

    /// Event version for schema evolution
    pub version: u32,

    /// Event payload
    pub payload: serde_json::Value,
}

impl Event {
    /// Create a new successful event.
    ///
    /// # Arguments
    ///
    /// * `event_type` - The event type string
    /// * `source` - The emitting component
    /// * `payload` - The event payload
    pub fn new(event_type: impl Into<String>, source: EventSource, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_type: event_type.into(),
            source,
            timestamp: Utc::now(),
            actor: None,
            outcome: Outcome::Success,
            version: 1,
            payload,
        }
    }

    /// Set the acting administrator.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Set the outcome.
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Get the topic for this event.
    ///
    /// Topics are structured as: `{source}.{event_type}`
    pub fn topic(&self) -> String {
        format!("{}.{}", self.source.as_str(), self.event_type)
    }

    /// Parse the payload into a specific type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Role management audit events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoleEvent {
    /// Role was created
    Created {
        role_id: Uuid,
        namespace: String,
        name: String,
    },
    /// Role rules were replaced
    Persisted {
        role_id: Uuid,
        namespace: String,
        name: String,
        rule_count: usize,
    },
    /// Role moved to another name or namespace
    Renamed {
        role_id: Uuid,
        old_namespace: String,
        old_name: String,
        namespace: String,
        name: String,
    },
    /// Role and its members were removed
    Deleted {
        role_id: Uuid,
        namespace: String,
        name: String,
        members_removed: usize,
    },
    /// Member was bound to a role
    MemberAdded {
        role_id: Uuid,
        member_id: Uuid,
        trust_anchor_id: String,
        match_key: String,
        match_value: String,
    },
    /// Member was unbound from a role
    MemberRemoved { role_id: Uuid, member_id: Uuid },
    /// A role change was refused
    AccessDenied {
        operation: String,
        role_id: Option<Uuid>,
        reason: String,
    },
}

impl RoleEvent {
    /// Event type string for this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            RoleEvent::Created { .. } => "role.created",
            RoleEvent::Persisted { .. } => "role.persisted",
            RoleEvent::Renamed { .. } => "role.renamed",
            RoleEvent::Deleted { .. } => "role.deleted",
            RoleEvent::MemberAdded { .. } => "role.member_added",
            RoleEvent::MemberRemoved { .. } => "role.member_removed",
            RoleEvent::AccessDenied { .. } => "role.access_denied",
        }
    }

    /// Convert to generic event.
    ///
    /// Refusals are recorded with a failure outcome.
    pub fn to_event(&self) -> Event {
        let outcome = match self {
            RoleEvent::AccessDenied { .. } => Outcome::Failure,
            _ => Outcome::Success,
        };
        let payload = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        Event::new(self.event_type(), EventSource::Roles, payload).with_outcome(outcome)
    }
}
