//! Domain layer
//!
//! Pure components with per-key locking. No I/O, no async: external
//! effects (index draws, payouts) are passed in as closures by the service.

pub mod airlines;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod flights;
pub mod gate;
pub mod insurance;
pub mod keyed;
pub mod oracles;
pub mod store;
pub mod value_objects;

pub use airlines::{Airline, AirlineRegistry};
pub use config::{
    credit_for, required_votes, ConfigError, SuretyConfig, BOOTSTRAP_LIMIT,
    DEFAULT_AIRLINE_MIN_FUNDING, DEFAULT_REGISTRATION_FEE, INDEXES_PER_ORACLE, INDEX_SPACE,
    MAX_PREMIUM, MIN_RESPONSES,
};
pub use coordinator::{ConsensusCoordinator, StatusRequest, Submission};
pub use errors::{SuretyError, SuretyResult};
pub use flights::{Flight, FlightCatalog};
pub use gate::AccessGate;
pub use insurance::{FundPool, InsuranceLedger};
pub use keyed::KeyedStore;
pub use oracles::{Oracle, OracleDirectory, OracleIndexes};
pub use store::SuretyStore;
pub use value_objects::{Admission, Credit, RequestTicket, ResponseOutcome};
