//! # Subscriptions
//!
//! A subscription owns a broadcast receiver and the filter it was opened
//! with. Dropping it removes the filter from the bus.

use crate::events::{EventFilter, SuretyEvent};
use crate::publisher::FilterRegistry;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Receiving handle returned by `InMemoryEventBus::subscribe`.
pub struct Subscription {
    id: u64,
    receiver: broadcast::Receiver<SuretyEvent>,
    filter: EventFilter,
    registry: FilterRegistry,
}

impl Subscription {
    pub(crate) fn new(
        id: u64,
        receiver: broadcast::Receiver<SuretyEvent>,
        filter: EventFilter,
        registry: FilterRegistry,
    ) -> Self {
        Self {
            id,
            receiver,
            filter,
            registry,
        }
    }

    /// Next event accepted by the filter, or `None` once the bus is gone.
    ///
    /// A subscriber that falls more than the channel capacity behind skips
    /// the overwritten events and carries on.
    pub async fn recv(&mut self) -> Option<SuretyEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(id = self.id, skipped, "Subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.write().remove(&self.id);
        debug!(id = self.id, "Subscription closed");
    }
}
