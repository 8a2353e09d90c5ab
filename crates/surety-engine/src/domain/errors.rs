//! Error types for the surety engine
//!
//! Every failure is local and synchronous. A failed mutation leaves all
//! state unchanged.

use shared_types::Amount;

/// Surety engine error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuretyError {
    #[error("Caller is not the administrator")]
    Unauthorized,

    #[error("Engine is not operational")]
    NotOperational,

    #[error("Identity is already registered")]
    AlreadyRegistered,

    #[error("Identity is not registered")]
    NotRegistered,

    #[error("Nominator is not a funded, registered airline")]
    NominatorNotFunded,

    #[error("Airline is not registered")]
    AirlineNotRegistered,

    #[error("Insufficient funding: paid {paid}, minimum {minimum}")]
    InsufficientFunding { paid: Amount, minimum: Amount },

    #[error("Insufficient registration fee: paid {paid}, required {required}")]
    InsufficientFee { paid: Amount, required: Amount },

    #[error("Premium must be greater than zero")]
    ZeroPremium,

    #[error("Premium {amount} exceeds cap {cap}")]
    PremiumExceedsCap { amount: Amount, cap: Amount },

    #[error("Unknown flight")]
    UnknownFlight,

    #[error("Flight has already been resolved")]
    FlightResolved,

    #[error("Index {index} does not match the oracle or the open request")]
    IndexMismatch { index: u8 },

    #[error("No open status request")]
    RequestNotOpen,

    #[error("Invalid status code: {0}")]
    InvalidStatusCode(u8),

    #[error("No credit to withdraw")]
    NoCredit,

    #[error("Payout failed: {0}")]
    PayoutFailed(String),
}

impl SuretyError {
    /// Short label for metrics and structured logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::NotOperational => "not_operational",
            Self::AlreadyRegistered => "already_registered",
            Self::NotRegistered => "not_registered",
            Self::NominatorNotFunded => "nominator_not_funded",
            Self::AirlineNotRegistered => "airline_not_registered",
            Self::InsufficientFunding { .. } => "insufficient_funding",
            Self::InsufficientFee { .. } => "insufficient_fee",
            Self::ZeroPremium => "zero_premium",
            Self::PremiumExceedsCap { .. } => "premium_exceeds_cap",
            Self::UnknownFlight => "unknown_flight",
            Self::FlightResolved => "flight_resolved",
            Self::IndexMismatch { .. } => "index_mismatch",
            Self::RequestNotOpen => "request_not_open",
            Self::InvalidStatusCode(_) => "invalid_status_code",
            Self::NoCredit => "no_credit",
            Self::PayoutFailed(_) => "payout_failed",
        }
    }
}

/// Result type for surety operations
pub type SuretyResult<T> = Result<T, SuretyError>;
