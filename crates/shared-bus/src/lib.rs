//! # Shared Bus - Event Bus for the Surety Engine
//!
//! Publish/subscribe boundary between the engine and everything outside it.
//!
//! ```text
//! ┌──────────────┐                    ┌────────────────┐
//! │ SuretyEngine │                    │ Oracle workers │
//! │              │    publish()       │  observers     │
//! │              │ ──────┐            │                │
//! └──────────────┘       │            └────────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! The engine never waits on subscribers: `OracleRequest` is broadcast and
//! oracle workers answer later through the engine's inbound API.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{Component, EventFilter, EventTopic, SuretyEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::Subscription;

/// Events buffered per subscriber before a slow one starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
