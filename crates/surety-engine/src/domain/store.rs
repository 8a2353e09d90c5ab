//! Engine state as one explicit object
//!
//! Every component lives here and is built from a validated
//! [`SuretyConfig`]; the service borrows it instead of reaching for globals.

use super::airlines::AirlineRegistry;
use super::config::{ConfigError, SuretyConfig};
use super::coordinator::ConsensusCoordinator;
use super::flights::FlightCatalog;
use super::gate::AccessGate;
use super::insurance::InsuranceLedger;
use super::oracles::OracleDirectory;
use shared_types::{keccak256, Hash};

/// All engine components.
pub struct SuretyStore {
    pub gate: AccessGate,
    pub airlines: AirlineRegistry,
    pub flights: FlightCatalog,
    pub ledger: InsuranceLedger,
    pub oracles: OracleDirectory,
    pub coordinator: ConsensusCoordinator,
}

impl SuretyStore {
    /// Build the components. Fails if the config is invalid.
    pub fn new(config: &SuretyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let entropy = Self::entropy(config);
        Ok(Self {
            gate: AccessGate::new(config.administrator),
            airlines: AirlineRegistry::with_genesis(
                config.genesis_airline,
                config.genesis_airline_name.clone(),
                config.airline_min_funding,
                config.bootstrap_limit,
            ),
            flights: FlightCatalog::new(),
            ledger: InsuranceLedger::new(),
            oracles: OracleDirectory::new(
                config.registration_fee,
                config.index_space,
                entropy,
            ),
            coordinator: ConsensusCoordinator::new(
                config.min_responses,
                config.index_space,
                entropy,
            ),
        })
    }

    /// Deployment-specific seed material mixed into every index draw.
    fn entropy(config: &SuretyConfig) -> Hash {
        let mut input = Vec::with_capacity(40);
        input.extend_from_slice(&config.administrator);
        input.extend_from_slice(&config.genesis_airline);
        keccak256(&input)
    }
}
