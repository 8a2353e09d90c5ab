//! # Surety Events
//!
//! Defines all event types that flow through the shared bus.
//!
//! Oracle workers subscribe to [`EventTopic::Oracles`] and answer
//! `OracleRequest` by calling back into the engine; every other event is
//! informational and lets observers follow governance, flight resolution and
//! settlement without polling.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, FlightKey, FlightStatus, Hash};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SuretyEvent {
    // =========================================================================
    // ACCESS GATE
    // =========================================================================
    /// The operational flag was flipped by the administrator.
    OperationalStatusChanged {
        /// New value of the flag.
        operational: bool,
    },

    // =========================================================================
    // AIRLINE REGISTRY
    // =========================================================================
    /// A vote was recorded for a candidate that is not yet admitted.
    AirlineNominated {
        /// Candidate airline.
        candidate: Address,
        /// Airline that cast the vote.
        nominator: Address,
        /// Distinct votes recorded so far.
        votes: usize,
        /// Votes needed for admission.
        required: usize,
    },

    /// An airline became a registered member.
    AirlineRegistered {
        /// The admitted airline.
        airline: Address,
        /// Human-readable name supplied at nomination.
        name: String,
    },

    /// An airline posted its stake.
    AirlineFunded {
        /// The funding airline.
        airline: Address,
        /// Amount added to the pool.
        amount: Amount,
    },

    // =========================================================================
    // FLIGHT CATALOG
    // =========================================================================
    /// A new flight was added to the catalog.
    FlightRegistered {
        /// The flight.
        flight: FlightKey,
    },

    /// Oracle consensus reached on a flight status.
    FlightStatusInfo {
        /// The flight.
        flight: FlightKey,
        /// Agreed status.
        status: FlightStatus,
    },

    // =========================================================================
    // INSURANCE LEDGER
    // =========================================================================
    /// A passenger escrowed a premium.
    InsurancePurchased {
        /// The insured passenger.
        passenger: Address,
        /// The insured flight.
        flight: FlightKey,
        /// Premium paid in this purchase.
        amount: Amount,
        /// Accumulated premium for this passenger and flight.
        total: Amount,
    },

    /// A passenger was credited after an airline-caused delay.
    PassengerCredited {
        /// The credited passenger.
        passenger: Address,
        /// The late flight.
        flight: FlightKey,
        /// Credit added (1.5x premium).
        amount: Amount,
    },

    /// A passenger withdrew their credit balance.
    CreditWithdrawn {
        /// The paid passenger.
        passenger: Address,
        /// Amount paid out.
        amount: Amount,
    },

    // =========================================================================
    // ORACLES & CONSENSUS
    // =========================================================================
    /// An oracle joined the directory.
    OracleRegistered {
        /// The oracle.
        oracle: Address,
        /// Its assigned index triple.
        indexes: [u8; 3],
    },

    /// Request for oracles holding `index` to report the flight's status.
    OracleRequest {
        /// Identifier of the request (index-scoped).
        request_id: Hash,
        /// Active index; only oracles holding it may answer.
        index: u8,
        /// The flight to report on.
        flight: FlightKey,
    },

    /// An oracle response was accepted into a tally.
    OracleReport {
        /// The reporting oracle.
        oracle: Address,
        /// Index the oracle answered under.
        index: u8,
        /// The flight.
        flight: FlightKey,
        /// Reported status.
        status: FlightStatus,
    },

    // =========================================================================
    // CRITICAL EVENTS (DLQ)
    // =========================================================================
    /// Critical error requiring operator attention.
    CriticalError {
        /// The component that encountered the error.
        component: Component,
        /// Error description.
        error: String,
    },
}

impl SuretyEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::OperationalStatusChanged { .. }
            | Self::AirlineNominated { .. }
            | Self::AirlineRegistered { .. }
            | Self::AirlineFunded { .. } => EventTopic::Governance,
            Self::FlightRegistered { .. } | Self::FlightStatusInfo { .. } => EventTopic::Flights,
            Self::InsurancePurchased { .. }
            | Self::PassengerCredited { .. }
            | Self::CreditWithdrawn { .. } => EventTopic::Insurance,
            Self::OracleRegistered { .. }
            | Self::OracleRequest { .. }
            | Self::OracleReport { .. } => EventTopic::Oracles,
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Get the originating component.
    #[must_use]
    pub fn source_component(&self) -> Component {
        match self {
            Self::OperationalStatusChanged { .. } => Component::AccessGate,
            Self::AirlineNominated { .. }
            | Self::AirlineRegistered { .. }
            | Self::AirlineFunded { .. } => Component::AirlineRegistry,
            Self::FlightRegistered { .. } => Component::FlightCatalog,
            Self::InsurancePurchased { .. }
            | Self::PassengerCredited { .. }
            | Self::CreditWithdrawn { .. } => Component::InsuranceLedger,
            Self::OracleRegistered { .. } => Component::OracleDirectory,
            Self::OracleRequest { .. }
            | Self::OracleReport { .. }
            | Self::FlightStatusInfo { .. } => Component::ConsensusCoordinator,
            Self::CriticalError { component, .. } => *component,
        }
    }
}

/// Engine components that publish events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    /// Operational circuit breaker.
    AccessGate,
    /// Membership and admission voting.
    AirlineRegistry,
    /// Registered flights and statuses.
    FlightCatalog,
    /// Premium escrow and credits.
    InsuranceLedger,
    /// Oracle registrations and index triples.
    OracleDirectory,
    /// Status requests and response tallies.
    ConsensusCoordinator,
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Gate and airline membership events.
    Governance,
    /// Flight registration and resolution.
    Flights,
    /// Purchases, credits and withdrawals.
    Insurance,
    /// Oracle registration, requests and reports.
    Oracles,
    /// Dead Letter Queue for critical errors.
    DeadLetterQueue,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source components to include. Empty means all sources.
    pub sources: Vec<Component>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            sources: Vec::new(),
        }
    }

    /// Create a filter for events from specific components.
    #[must_use]
    pub fn from_components(sources: Vec<Component>) -> Self {
        Self {
            topics: Vec::new(),
            sources,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &SuretyEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match =
            self.sources.is_empty() || self.sources.contains(&event.source_component());

        topic_match && source_match
    }
}
