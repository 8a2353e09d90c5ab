//! # Flight Catalog
//!
//! Registered flights and their agreed status. A flight starts `Unknown` and
//! is written once by consensus finalization; later finalizations are no-ops.

use super::errors::{SuretyError, SuretyResult};
use super::keyed::KeyedStore;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{FlightKey, FlightStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// A registered flight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub key: FlightKey,
    pub status: FlightStatus,
    /// Registration order across the catalog.
    pub sequence: u64,
}

/// Catalog of flights keyed by `(airline, code, timestamp)`.
pub struct FlightCatalog {
    flights: KeyedStore<FlightKey, Flight>,
    /// code → (sequence, key) of the most recently registered flight
    latest_by_code: RwLock<HashMap<String, (u64, FlightKey)>>,
    sequence: AtomicU64,
}

impl FlightCatalog {
    pub fn new() -> Self {
        Self {
            flights: KeyedStore::new(),
            latest_by_code: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Add a flight in `Unknown` state. Returns true if it was new.
    ///
    /// The caller checks that the airline is registered.
    pub fn register(&self, key: &FlightKey) -> bool {
        if self.flights.contains(key) {
            return false;
        }
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let flight = Flight {
            key: key.clone(),
            status: FlightStatus::Unknown,
            sequence,
        };
        let (_, created) = self.flights.insert_if_absent(key, flight);
        if !created {
            return false;
        }

        let mut latest = self.latest_by_code.write();
        let newer = latest
            .get(&key.code)
            .map_or(true, |(seen, _)| *seen < sequence);
        if newer {
            latest.insert(key.code.clone(), (sequence, key.clone()));
        }
        info!(flight = %key, sequence, "Flight registered");
        true
    }

    pub fn contains(&self, key: &FlightKey) -> bool {
        self.flights.contains(key)
    }

    /// Key of the most recently registered flight with `code`.
    pub fn key_for_code(&self, code: &str) -> Option<FlightKey> {
        self.latest_by_code
            .read()
            .get(code)
            .map(|(_, key)| key.clone())
    }

    /// Status of the most recently registered flight with `code`.
    /// Unknown codes read as `Unknown`.
    pub fn check_status(&self, code: &str) -> FlightStatus {
        self.key_for_code(code)
            .and_then(|key| self.status(&key))
            .unwrap_or_default()
    }

    pub fn status(&self, key: &FlightKey) -> Option<FlightStatus> {
        self.flights.get(key).map(|slot| slot.lock().status)
    }

    pub fn flight(&self, key: &FlightKey) -> Option<Flight> {
        self.flights.snapshot(key)
    }

    /// Write the agreed status. Returns true only when the flight moved
    /// from `Unknown` to a resolved status.
    pub fn finalize(&self, key: &FlightKey, status: FlightStatus) -> SuretyResult<bool> {
        let slot = self.flights.get(key).ok_or(SuretyError::UnknownFlight)?;
        let mut flight = slot.lock();
        if flight.status.is_resolved() || !status.is_resolved() {
            debug!(flight = %key, current = %flight.status, %status, "Finalization ignored");
            return Ok(false);
        }
        flight.status = status;
        info!(flight = %key, %status, "Flight status finalized");
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}

impl Default for FlightCatalog {
    fn default() -> Self {
        Self::new()
    }
}
