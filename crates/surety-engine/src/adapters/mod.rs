//! Adapters layer (Hexagonal Architecture)

pub mod event_bus;

pub use event_bus::{BusEventSink, RecordingEventSink};
