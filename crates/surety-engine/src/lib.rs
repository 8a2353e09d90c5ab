//! # surety-engine
//!
//! Governance and settlement core for federated flight-delay insurance.
//!
//! ## Architecture
//!
//! Hexagonal, like the rest of the workspace:
//!
//! ```text
//!                 ┌────────────────────────────────────────┐
//!  SuretyApi ───▶ │ SuretyService                          │
//!   (inbound)     │   ┌──────────────── SuretyStore ─────┐ │
//!                 │   │ AccessGate      AirlineRegistry  │ │
//!                 │   │ FlightCatalog   InsuranceLedger  │ │
//!                 │   │ OracleDirectory ConsensusCoord.  │ │
//!                 │   └──────────────────────────────────┘ │
//!                 └───────┬───────────────┬────────────┬───┘
//!                         ▼               ▼            ▼
//!                    EventSink       IndexSource   PayoutSink
//!                   (shared bus)     (randomness)  (value rail)
//! ```
//!
//! ### Oracle round
//!
//! `fetch_flight_status` opens a request under a drawn index and publishes
//! `OracleRequest`. Oracle workers holding that index answer through
//! `submit_oracle_response`. Once `MIN_RESPONSES` oracles agree the flight
//! status is finalized and, for `LateAirline`, every policy holder is
//! credited 1.5x their premium.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use surety_engine::{SuretyService, SuretyDependencies, SuretyConfig};
//! use surety_engine::adapters::BusEventSink;
//! use surety_engine::ports::{KeccakIndexSource, NullPayout, SuretyApi};
//!
//! let service = SuretyService::new(SuretyDependencies {
//!     events: Arc::new(BusEventSink::new(bus)),
//!     index_source: Arc::new(KeccakIndexSource::default()),
//!     payout: Arc::new(NullPayout),
//!     config: SuretyConfig::with_administrator(admin),
//! })?;
//!
//! service.fund(admin, 10 * ETHER).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{BusEventSink, RecordingEventSink};
pub use domain::{
    Admission, ConfigError, RequestTicket, ResponseOutcome, SuretyConfig, SuretyError,
    SuretyResult, SuretyStore,
};
pub use ports::{EventSink, IndexSource, KeccakIndexSource, NullPayout, PayoutSink, SuretyApi};
pub use service::{SuretyDependencies, SuretyService};
