//! # PKI Audit Events
//!
//! This crate provides the audit event bus for CA administration: every
//! committed role change, and every refused one, is published as an event
//! that audit log writers and other subscribers can consume.
//!
//! ## Overview
//!
//! The pki-events crate handles:
//! - **Event Types**: The event envelope and strongly-typed role events
//! - **Event Bus**: Publish/subscribe messaging
//! - **Event Handlers**: Async event processing
//!
//! ## Features
//!
//! - `memory` (default): In-memory event bus for single-process deployments
//!
//! ## Usage
//!
//! ### Publishing Events
//!
//! ```rust,no_run
//! use pki_events::{EventBus, MemoryEventBus, RoleEvent};
//! use uuid::Uuid;
//!
//! async fn publish_example() {
//!     let bus = MemoryEventBus::new();
//!
//!     let role_event = RoleEvent::Created {
//!         role_id: Uuid::now_v7(),
//!         namespace: String::new(),
//!         name: "CA Administrators".to_string(),
//!     };
//!
//!     bus.publish(role_event.to_event().with_actor("CN=SuperAdmin")).await.unwrap();
//! }
//! ```
//!
//! ### Subscribing to Events
//!
//! ```rust,no_run
//! use pki_events::{EventBus, MemoryEventBus};
//!
//! async fn subscribe_example() {
//!     let bus = MemoryEventBus::new();
//!
//!     // Every role management event
//!     let mut sub = bus.subscribe("roles.#").await.unwrap();
//!
//!     while let Ok(event) = sub.recv().await {
//!         println!("{} by {:?}", event.event_type, event.actor);
//!     }
//! }
//! ```
//!
//! ## Topic Patterns
//!
//! Topics are structured as `{source}.{event_type}`:
//! - `roles.role.created` - Specific event
//! - `roles.role.*` - All role events
//! - `roles.#` - Everything from role management
//! - `#` - All events
//!
//! Wildcards:
//! - `*` matches exactly one segment
//! - `#` matches zero or more segments

pub mod bus;
pub mod types;

// Re-export main types
pub use bus::{EventBus, EventBusError, EventBusResult, EventBusStats, EventHandler, MemoryEventBus, Subscription};
pub use types::{Event, EventSource, Outcome, RoleEvent};
