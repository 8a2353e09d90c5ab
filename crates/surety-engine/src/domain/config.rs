//! Engine configuration and protocol constants

use shared_types::{Address, Amount, ETHER};

/// Per-purchase premium cap.
pub const MAX_PREMIUM: Amount = ETHER;

/// Credit multiplier numerator (credit = premium * 3 / 2).
pub const CREDIT_NUMERATOR: Amount = 3;

/// Credit multiplier denominator.
pub const CREDIT_DENOMINATOR: Amount = 2;

/// Matching oracle responses needed to accept a status.
pub const MIN_RESPONSES: usize = 3;

/// Airlines admitted without a vote.
pub const BOOTSTRAP_LIMIT: usize = 4;

/// Size of the oracle index space.
pub const INDEX_SPACE: u8 = 10;

/// Indexes held by each oracle.
pub const INDEXES_PER_ORACLE: usize = 3;

/// Default oracle registration fee.
pub const DEFAULT_REGISTRATION_FEE: Amount = ETHER;

/// Default minimum airline stake.
pub const DEFAULT_AIRLINE_MIN_FUNDING: Amount = 10 * ETHER;

/// Configuration errors raised by [`SuretyConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("administrator address must not be zero")]
    ZeroAdministrator,

    #[error("genesis airline address must not be zero")]
    ZeroGenesisAirline,

    #[error("index space {0} cannot hold {INDEXES_PER_ORACLE} distinct indexes")]
    IndexSpaceTooSmall(u8),

    #[error("min responses must be at least 1")]
    ZeroMinResponses,

    #[error("bootstrap limit must be at least 1")]
    ZeroBootstrapLimit,

    #[error("{0} must be greater than zero")]
    ZeroAmount(&'static str),
}

/// Engine configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuretyConfig {
    /// Identity allowed to toggle the operational gate
    pub administrator: Address,
    /// Airline registered (unfunded) at construction
    pub genesis_airline: Address,
    /// Name recorded for the genesis airline
    pub genesis_airline_name: String,
    /// Fee an oracle pays to join the directory
    pub registration_fee: Amount,
    /// Minimum stake per `fund` call
    pub airline_min_funding: Amount,
    /// Oracle index space size
    pub index_space: u8,
    /// Matching responses required for consensus
    pub min_responses: usize,
    /// Registered airlines admitted without voting
    pub bootstrap_limit: usize,
}

impl Default for SuretyConfig {
    fn default() -> Self {
        let administrator = [0x01; 20];
        Self {
            administrator,
            genesis_airline: administrator,
            genesis_airline_name: "Genesis Air".to_string(),
            registration_fee: DEFAULT_REGISTRATION_FEE,
            airline_min_funding: DEFAULT_AIRLINE_MIN_FUNDING,
            index_space: INDEX_SPACE,
            min_responses: MIN_RESPONSES,
            bootstrap_limit: BOOTSTRAP_LIMIT,
        }
    }
}

impl SuretyConfig {
    /// Config where the administrator is also the genesis airline.
    pub fn with_administrator(administrator: Address) -> Self {
        Self {
            administrator,
            genesis_airline: administrator,
            ..Self::default()
        }
    }

    /// Reject configurations the engine cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.administrator == [0u8; 20] {
            return Err(ConfigError::ZeroAdministrator);
        }
        if self.genesis_airline == [0u8; 20] {
            return Err(ConfigError::ZeroGenesisAirline);
        }
        if (self.index_space as usize) < INDEXES_PER_ORACLE {
            return Err(ConfigError::IndexSpaceTooSmall(self.index_space));
        }
        if self.min_responses == 0 {
            return Err(ConfigError::ZeroMinResponses);
        }
        if self.bootstrap_limit == 0 {
            return Err(ConfigError::ZeroBootstrapLimit);
        }
        if self.registration_fee == 0 {
            return Err(ConfigError::ZeroAmount("registration fee"));
        }
        if self.airline_min_funding == 0 {
            return Err(ConfigError::ZeroAmount("airline minimum funding"));
        }
        Ok(())
    }
}

/// Credit owed for a premium on an airline-caused delay.
#[must_use]
pub const fn credit_for(premium: Amount) -> Amount {
    premium.saturating_mul(CREDIT_NUMERATOR) / CREDIT_DENOMINATOR
}

/// Votes needed to admit a candidate once bootstrap is over.
#[must_use]
pub const fn required_votes(registered: usize) -> usize {
    registered.div_ceil(2)
}
