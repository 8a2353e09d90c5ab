//! Outcomes returned by engine operations

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, FlightKey, FlightStatus, Hash};

/// Result of nominating an airline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Admission {
    /// The candidate is now a registered member.
    Registered,
    /// The vote was counted but the threshold is not met yet.
    VoteRecorded { votes: usize, required: usize },
    /// This nominator already voted for the candidate.
    AlreadyVoted,
    /// The candidate was already a member. Nothing changed.
    AlreadyRegistered,
}

impl Admission {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered | Self::AlreadyRegistered)
    }
}

/// Handle for an opened status request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTicket {
    /// `keccak256(index ‖ airline ‖ code ‖ timestamp)`
    pub request_id: Hash,
    /// Active index; only oracles holding it may answer.
    pub index: u8,
    /// Flight the request is about.
    pub flight: FlightKey,
}

/// Result of an oracle response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseOutcome {
    /// Vote counted; `matching` oracles now agree on `status`.
    Recorded {
        status: FlightStatus,
        matching: usize,
        required: usize,
    },
    /// This oracle already answered the request.
    Duplicate,
    /// Quorum reached and the request closed.
    Resolved(FlightStatus),
}

/// Credit granted to one passenger on settlement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub passenger: Address,
    pub amount: Amount,
}
