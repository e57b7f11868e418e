//! Event bus implementation
//!
//! This module provides the event bus abstraction and the in-memory
//! implementation used to fan audit events out to subscribers and handlers.

use crate::types::Event;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

/// Event bus error types.
#[derive(Debug, Error)]
pub enum EventBusError {
    /// Failed to publish event
    #[error("Failed to publish event: {0}")]
    PublishError(String),

    /// Failed to subscribe
    #[error("Failed to subscribe: {0}")]
    SubscribeError(String),

    /// Unknown subscription
    #[error("Unknown subscription: {0}")]
    UnknownSubscription(String),

    /// Channel closed
    #[error("Channel closed")]
    ChannelClosed,
}

/// Result type for event bus operations.
pub type EventBusResult<T> = Result<T, EventBusError>;

/// Subscription handle for receiving events.
pub struct Subscription {
    /// Subscription ID
    pub id: String,
    /// Topic pattern
    pub topic: String,
    /// Event receiver
    pub receiver: broadcast::Receiver<Event>,
}

impl Subscription {
    /// Receive the next event.
    pub async fn recv(&mut self) -> EventBusResult<Event> {
        self.receiver
            .recv()
            .await
            .map_err(|_| EventBusError::ChannelClosed)
    }

    /// Receive an already published event without waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }
}

/// Event handler trait for processing events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle an event.
    async fn handle(&self, event: Event) -> EventBusResult<()>;

    /// Get the topics this handler is interested in.
    fn topics(&self) -> Vec<String>;
}

/// Event bus trait for publish/subscribe operations.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish an event.
    async fn publish(&self, event: Event) -> EventBusResult<()>;

    /// Subscribe to a topic pattern.
    ///
    /// Topic patterns support wildcards:
    /// - `*` matches any single segment
    /// - `#` matches zero or more segments
    ///
    /// Examples:
    /// - `roles.role.*` matches `roles.role.created`, `roles.role.deleted`
    /// - `roles.#` matches every role management event
    async fn subscribe(&self, topic: &str) -> EventBusResult<Subscription>;

    /// Register an event handler.
    async fn register_handler(&self, handler: Arc<dyn EventHandler>) -> EventBusResult<()>;

    /// Unsubscribe.
    async fn unsubscribe(&self, subscription_id: &str) -> EventBusResult<()>;

    /// Get event bus stats.
    async fn stats(&self) -> EventBusStats;
}

/// Event bus statistics.
#[derive(Debug, Clone, Default)]
pub struct EventBusStats {
    /// Total events published
    pub events_published: u64,
    /// Total deliveries to subscribers
    pub events_delivered: u64,
    /// Active subscriptions
    pub active_subscriptions: usize,
    /// Registered handlers
    pub registered_handlers: usize,
}

/// In-memory event bus implementation.
///
/// Suitable for single-process deployments and testing.
pub struct MemoryEventBus {
    /// Topic pattern -> channel
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<Event>>>>,
    /// Subscription ID -> topic pattern
    subscriptions: Arc<RwLock<HashMap<String, String>>>,
    /// Registered handlers
    handlers: Arc<RwLock<Vec<Arc<dyn EventHandler>>>>,
    /// Statistics
    stats: Arc<RwLock<EventBusStats>>,
    /// Default channel capacity
    channel_capacity: usize,
}

impl std::fmt::Debug for MemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventBus")
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

impl MemoryEventBus {
    /// Create a new in-memory event bus.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create with custom channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            handlers: Arc::new(RwLock::new(Vec::new())),
            stats: Arc::new(RwLock::new(EventBusStats::default())),
            channel_capacity: capacity,
        }
    }

    /// Check if a topic matches a pattern.
    pub fn topic_matches(pattern: &str, topic: &str) -> bool {
        let pattern_parts: Vec<&str> = pattern.split('.').collect();
        let topic_parts: Vec<&str> = topic.split('.').collect();
        Self::segments_match(&pattern_parts, &topic_parts)
    }

    fn segments_match(pattern: &[&str], topic: &[&str]) -> bool {
        match pattern.split_first() {
            None => topic.is_empty(),
            Some((&"#", rest)) => (0..=topic.len()).any(|skip| Self::segments_match(rest, &topic[skip..])),
            Some((&segment, rest)) => match topic.split_first() {
                Some((&head, tail)) if segment == "*" || segment == head => {
                    Self::segments_match(rest, tail)
                }
                _ => false,
            },
        }
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn publish(&self, event: Event) -> EventBusResult<()> {
        let topic = event.topic();

        let mut delivered = 0u64;
        {
            let channels = self.channels.read().await;
            for (pattern, sender) in channels.iter() {
                if Self::topic_matches(pattern, &topic) {
                    // no receivers left is not an error for a fan-out bus
                    if let Ok(receivers) = sender.send(event.clone()) {
                        delivered += receivers as u64;
                    }
                }
            }
        }

        let handlers = self.handlers.read().await;
        for handler in handlers.iter() {
            if handler
                .topics()
                .iter()
                .any(|handler_topic| Self::topic_matches(handler_topic, &topic))
            {
                let handler = handler.clone();
                let event = event.clone();
                tokio::task::spawn(async move {
                    if let Err(e) = handler.handle(event).await {
                        tracing::error!(error = %e, "Event handler failed");
                    }
                });
                delivered += 1;
            }
        }

        let mut stats = self.stats.write().await;
        stats.events_published += 1;
        stats.events_delivered += delivered;

        tracing::trace!(topic = %topic, event_id = %event.id, delivered, "Published event");
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> EventBusResult<Subscription> {
        if topic.trim().is_empty() {
            return Err(EventBusError::SubscribeError("empty topic pattern".to_string()));
        }
        let id = uuid::Uuid::now_v7().to_string();

        let receiver = {
            let mut channels = self.channels.write().await;
            if let Some(sender) = channels.get(topic) {
                sender.subscribe()
            } else {
                let (sender, receiver) = broadcast::channel(self.channel_capacity);
                channels.insert(topic.to_string(), sender);
                receiver
            }
        };

        self.subscriptions
            .write()
            .await
            .insert(id.clone(), topic.to_string());
        self.stats.write().await.active_subscriptions += 1;

        Ok(Subscription {
            id,
            topic: topic.to_string(),
            receiver,
        })
    }

    async fn register_handler(&self, handler: Arc<dyn EventHandler>) -> EventBusResult<()> {
        self.handlers.write().await.push(handler);
        self.stats.write().await.registered_handlers += 1;
        Ok(())
    }

    async fn unsubscribe(&self, subscription_id: &str) -> EventBusResult<()> {
        let topic = self
            .subscriptions
            .write()
            .await
            .remove(subscription_id)
            .ok_or_else(|| EventBusError::UnknownSubscription(subscription_id.to_string()))?;

        let still_used = self.subscriptions.read().await.values().any(|t| *t == topic);
        if !still_used {
            self.channels.write().await.remove(&topic);
        }

        let mut stats = self.stats.write().await;
        stats.active_subscriptions = stats.active_subscriptions.saturating_sub(1);
        Ok(())
    }

    async fn stats(&self) -> EventBusStats {
        self.stats.read().await.clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
