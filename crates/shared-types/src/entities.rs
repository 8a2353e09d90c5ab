//! # Core Domain Entities
//!
//! Identities, value amounts, flight keys and the flight status codes
//! reported by oracles.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `Hash`
//! - **Value**: `Amount`, `ETHER`
//! - **Flights**: `FlightKey`, `FlightStatus`

use crate::errors::ParseError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 20-byte Ethereum-style account address.
///
/// Airlines, passengers, oracles and the administrator are all identified
/// by an `Address`.
pub type Address = [u8; 20];

/// A 32-byte Keccak-256 hash.
pub type Hash = [u8; 32];

/// Keccak-256 over arbitrary bytes.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Render an address as `0x`-prefixed lowercase hex.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Parse a `0x`-prefixed (or bare) 40-character hex string into an address.
pub fn parse_address(input: &str) -> Result<Address, ParseError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| ParseError::InvalidAddressLength { expected: 20, actual: len })
}

// =============================================================================
// CLUSTER B: VALUE
// =============================================================================

/// Value amount in wei.
pub type Amount = u128;

/// One value-unit (10^18 wei).
pub const ETHER: Amount = 1_000_000_000_000_000_000;

// =============================================================================
// CLUSTER C: FLIGHTS
// =============================================================================

/// Status of a flight as reported by oracles.
///
/// The numeric codes are the wire values oracles submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FlightStatus {
    /// No status has been agreed yet.
    #[default]
    Unknown,
    /// Departed on time.
    OnTime,
    /// Late, airline at fault. The only status that pays out.
    LateAirline,
    /// Late because of weather.
    LateWeather,
    /// Late because of a technical problem.
    LateTechnical,
    /// Late for any other reason.
    LateOther,
}

impl FlightStatus {
    /// Every status, in code order.
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    /// Wire code submitted by oracles.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::OnTime => 10,
            Self::LateAirline => 20,
            Self::LateWeather => 30,
            Self::LateTechnical => 40,
            Self::LateOther => 50,
        }
    }

    /// Decode a wire code. Returns `None` for codes outside the enum.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Unknown),
            10 => Some(Self::OnTime),
            20 => Some(Self::LateAirline),
            30 => Some(Self::LateWeather),
            40 => Some(Self::LateTechnical),
            50 => Some(Self::LateOther),
            _ => None,
        }
    }

    /// True once a flight carries an agreed, non-`Unknown` status.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl FlightStatus {
    /// Short kebab-case name, used for labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::OnTime => "on-time",
            Self::LateAirline => "late-airline",
            Self::LateWeather => "late-weather",
            Self::LateTechnical => "late-technical",
            Self::LateOther => "late-other",
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// Identity of a single scheduled flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    /// Operating airline.
    pub airline: Address,
    /// Flight code, e.g. `SQ123`.
    pub code: String,
    /// Scheduled departure, unix seconds.
    pub timestamp: u64,
}

impl FlightKey {
    /// Create a new flight key.
    pub fn new(airline: Address, code: impl Into<String>, timestamp: u64) -> Self {
        Self {
            airline,
            code: code.into(),
            timestamp,
        }
    }

    /// Keccak-256 of `airline ‖ code ‖ timestamp`.
    #[must_use]
    pub fn hash(&self) -> Hash {
        let mut input = Vec::with_capacity(20 + self.code.len() + 8);
        input.extend_from_slice(&self.airline);
        input.extend_from_slice(self.code.as_bytes());
        input.extend_from_slice(&self.timestamp.to_be_bytes());
        keccak256(&input)
    }

    /// Identifier of a status request for this flight under one oracle index:
    /// Keccak-256 of `index ‖ airline ‖ code ‖ timestamp`.
    #[must_use]
    pub fn request_id(&self, index: u8) -> Hash {
        let mut input = Vec::with_capacity(1 + 20 + self.code.len() + 8);
        input.push(index);
        input.extend_from_slice(&self.airline);
        input.extend_from_slice(self.code.as_bytes());
        input.extend_from_slice(&self.timestamp.to_be_bytes());
        keccak256(&input)
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} ({})",
            self.code,
            self.timestamp,
            format_address(&self.airline)
        )
    }
}
