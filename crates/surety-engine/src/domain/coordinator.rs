//! # Consensus Coordinator
//!
//! Status requests keyed by `(index, flight)` and their response tallies.
//!
//! A request is `Open` until one status collects `min_responses` distinct
//! oracles, then `Resolved`. The tally update, the catalog write and the
//! ledger settlement all happen under the request lock, so a request
//! finalizes exactly once however responses race.

use super::errors::{SuretyError, SuretyResult};
use super::flights::FlightCatalog;
use super::insurance::InsuranceLedger;
use super::keyed::KeyedStore;
use super::oracles::OracleDirectory;
use super::value_objects::{Credit, RequestTicket, ResponseOutcome};
use parking_lot::RwLock;
use shared_types::{format_address, keccak256, Address, FlightKey, FlightStatus, Hash};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct RequestKey {
    index: u8,
    flight: FlightKey,
}

/// One status request and its tally.
#[derive(Clone, Debug)]
pub struct StatusRequest {
    pub request_id: Hash,
    pub requester: Address,
    pub index: u8,
    pub flight: FlightKey,
    pub open: bool,
    /// Status agreed by quorum, once resolved.
    pub resolution: Option<FlightStatus>,
    responses: HashMap<FlightStatus, BTreeSet<Address>>,
}

impl StatusRequest {
    fn open(requester: Address, index: u8, flight: FlightKey) -> Self {
        Self {
            request_id: flight.request_id(index),
            requester,
            index,
            flight,
            open: true,
            resolution: None,
            responses: HashMap::new(),
        }
    }

    fn has_responded(&self, oracle: &Address) -> bool {
        self.responses.values().any(|voters| voters.contains(oracle))
    }

    /// Oracles that reported `status`.
    pub fn responses_for(&self, status: FlightStatus) -> usize {
        self.responses.get(&status).map_or(0, BTreeSet::len)
    }
}

/// Result of a submitted response, with what it triggered downstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub outcome: ResponseOutcome,
    /// True when the catalog moved to the agreed status.
    pub finalized: bool,
    /// Credits granted by settlement.
    pub credits: Vec<Credit>,
}

impl Submission {
    fn tally(outcome: ResponseOutcome) -> Self {
        Self {
            outcome,
            finalized: false,
            credits: Vec::new(),
        }
    }
}

/// Orchestrates status requests.
pub struct ConsensusCoordinator {
    requests: KeyedStore<RequestKey, StatusRequest>,
    /// Indexes a request was ever opened under, per flight.
    active: RwLock<HashMap<FlightKey, BTreeSet<u8>>>,
    min_responses: usize,
    index_space: u8,
    entropy: Hash,
    nonce: AtomicU64,
}

impl ConsensusCoordinator {
    pub fn new(min_responses: usize, index_space: u8, entropy: Hash) -> Self {
        Self {
            requests: KeyedStore::new(),
            active: RwLock::new(HashMap::new()),
            min_responses,
            index_space,
            entropy,
            nonce: AtomicU64::new(0),
        }
    }

    pub fn min_responses(&self) -> usize {
        self.min_responses
    }

    /// Open (or reuse) a request for `flight` under an index drawn through
    /// `draw`. An open request under the same index keeps its tally; a
    /// closed one is reopened with an empty tally.
    pub fn open_request<F>(
        &self,
        requester: &Address,
        flight: &FlightKey,
        draw: F,
    ) -> RequestTicket
    where
        F: FnOnce(&Hash) -> u8,
    {
        let seed = self.next_seed(requester, flight);
        let index = draw(&seed) % self.index_space;
        let key = RequestKey {
            index,
            flight: flight.clone(),
        };

        let (slot, created) = self.requests.insert_if_absent(
            &key,
            StatusRequest::open(*requester, index, flight.clone()),
        );
        if !created {
            let mut request = slot.lock();
            if !request.open {
                *request = StatusRequest::open(*requester, index, flight.clone());
            }
        }
        self.active
            .write()
            .entry(flight.clone())
            .or_default()
            .insert(index);

        info!(
            flight = %flight,
            index,
            requester = %format_address(requester),
            reused = !created,
            "Status request opened"
        );
        RequestTicket {
            request_id: flight.request_id(index),
            index,
            flight: flight.clone(),
        }
    }

    fn next_seed(&self, requester: &Address, flight: &FlightKey) -> Hash {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let mut input = Vec::with_capacity(20 + 32 + 8 + 32);
        input.extend_from_slice(requester);
        input.extend_from_slice(&flight.hash());
        input.extend_from_slice(&nonce.to_be_bytes());
        input.extend_from_slice(&self.entropy);
        keccak256(&input)
    }

    /// Record `oracle`'s report and finalize on quorum.
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &self,
        oracle: &Address,
        index: u8,
        flight: &FlightKey,
        status: FlightStatus,
        directory: &OracleDirectory,
        catalog: &FlightCatalog,
        ledger: &InsuranceLedger,
    ) -> SuretyResult<Submission> {
        let indexes = directory.indexes_of(oracle)?;
        if !indexes.contains(&index) {
            return Err(SuretyError::IndexMismatch { index });
        }

        let key = RequestKey {
            index,
            flight: flight.clone(),
        };
        let Some(slot) = self.requests.get(&key) else {
            return Err(self.missing_request_error(index, flight));
        };

        let mut request = slot.lock();
        if !request.open || catalog.status(flight).is_some_and(FlightStatus::is_resolved) {
            return Err(SuretyError::RequestNotOpen);
        }
        if request.has_responded(oracle) {
            debug!(
                oracle = %format_address(oracle),
                flight = %flight,
                index,
                "Duplicate response ignored"
            );
            return Ok(Submission::tally(ResponseOutcome::Duplicate));
        }

        let voters = request.responses.entry(status).or_default();
        voters.insert(*oracle);
        let matching = voters.len();
        debug!(
            oracle = %format_address(oracle),
            flight = %flight,
            index,
            %status,
            matching,
            "Oracle response recorded"
        );

        if matching < self.min_responses {
            return Ok(Submission::tally(ResponseOutcome::Recorded {
                status,
                matching,
                required: self.min_responses,
            }));
        }

        let finalized = catalog.finalize(flight, status)?;
        request.open = false;
        request.resolution = Some(status);
        let credits = if finalized {
            ledger.on_flight_resolved(flight, status)
        } else {
            Vec::new()
        };
        info!(flight = %flight, index, %status, finalized, "Status request resolved");

        Ok(Submission {
            outcome: ResponseOutcome::Resolved(status),
            finalized,
            credits,
        })
    }

    fn missing_request_error(&self, index: u8, flight: &FlightKey) -> SuretyError {
        let active = self.active.read();
        let open_elsewhere = active.get(flight).is_some_and(|indexes| {
            indexes.iter().any(|other| {
                *other != index
                    && self
                        .request(*other, flight)
                        .is_some_and(|request| request.open)
            })
        });
        if open_elsewhere {
            SuretyError::IndexMismatch { index }
        } else {
            SuretyError::RequestNotOpen
        }
    }

    /// Snapshot of the request for `(index, flight)`.
    pub fn request(&self, index: u8, flight: &FlightKey) -> Option<StatusRequest> {
        self.requests.snapshot(&RequestKey {
            index,
            flight: flight.clone(),
        })
    }

    /// Indexes with an open request for `flight`.
    pub fn open_indexes(&self, flight: &FlightKey) -> Vec<u8> {
        let active = self.active.read();
        active
            .get(flight)
            .map(|indexes| {
                indexes
                    .iter()
                    .copied()
                    .filter(|index| self.request(*index, flight).is_some_and(|r| r.open))
                    .collect()
            })
            .unwrap_or_default()
    }
}
