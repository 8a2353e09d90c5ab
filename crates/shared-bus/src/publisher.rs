//! # Event Publisher
//!
//! Broadcast side of the bus. Every subscription holds a receiver on one
//! `tokio::sync::broadcast` channel and filters on receive; the bus also
//! keeps each live subscription's filter so a publish knows how many
//! subscribers actually want the event.

use crate::events::{EventFilter, SuretyEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Live subscription filters by subscription id.
pub(crate) type FilterRegistry = Arc<RwLock<HashMap<u64, EventFilter>>>;

/// Publishing side of the bus, as seen by the engine.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event. Returns the number of subscribers whose filter
    /// accepts it; zero means the event was dropped.
    async fn publish(&self, event: SuretyEvent) -> usize;

    /// Events handed to `publish` so far, delivered or not.
    fn events_published(&self) -> u64;
}

/// Single-process bus over `tokio::sync::broadcast`.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<SuretyEvent>,
    filters: FilterRegistry,
    next_id: AtomicU64,
    published: AtomicU64,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            sender,
            filters: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            published: AtomicU64::new(0),
        }
    }

    /// Subscribe to events accepted by `filter`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let receiver = self.sender.subscribe();
        self.filters.write().insert(id, filter.clone());
        debug!(id, topics = ?filter.topics, "Subscription opened");
        Subscription::new(id, receiver, filter, self.filters.clone())
    }

    /// Live subscriptions, whatever their filters.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.filters.read().len()
    }

    /// Live subscriptions whose filter accepts `event`.
    #[must_use]
    pub fn interested_in(&self, event: &SuretyEvent) -> usize {
        self.filters
            .read()
            .values()
            .filter(|filter| filter.matches(event))
            .count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: SuretyEvent) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        let topic = event.topic();
        let source = event.source_component();

        let interested = self.interested_in(&event);
        if interested == 0 {
            warn!(?topic, ?source, "Event dropped (no interested subscribers)");
            return 0;
        }

        match self.sender.send(event) {
            Ok(_) => {
                debug!(?topic, ?source, interested, "Event published");
                interested
            }
            // Every receiver went away between the filter check and the send.
            Err(_) => {
                warn!(?topic, ?source, "Event dropped (no receivers)");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
