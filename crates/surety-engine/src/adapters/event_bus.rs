//! Event sink adapters
//!
//! `BusEventSink` forwards engine events onto the shared bus.
//! `RecordingEventSink` keeps them in memory for tests and the demo node.

use crate::ports::EventSink;
use async_trait::async_trait;
use shared_bus::{EventPublisher, SuretyEvent};
use std::sync::Arc;
use tracing::trace;

/// Publishes engine events to a shared-bus publisher.
pub struct BusEventSink<P: EventPublisher> {
    bus: Arc<P>,
}

impl<P: EventPublisher> BusEventSink<P> {
    pub fn new(bus: Arc<P>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Arc<P> {
        &self.bus
    }
}

#[async_trait]
impl<P: EventPublisher> EventSink for BusEventSink<P> {
    async fn publish(&self, event: SuretyEvent) {
        let topic = event.topic();
        let receivers = self.bus.publish(event).await;
        trace!(?topic, receivers, "Event forwarded to bus");
    }
}

/// In-memory event sink
pub struct RecordingEventSink {
    events: parking_lot::RwLock<Vec<SuretyEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self {
            events: parking_lot::RwLock::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<SuretyEvent> {
        self.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    /// Count events matching `predicate`.
    pub fn count_where(&self, predicate: impl Fn(&SuretyEvent) -> bool) -> usize {
        self.events.read().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl Default for RecordingEventSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn publish(&self, event: SuretyEvent) {
        self.events.write().push(event);
    }
}
