//! Driving ports (Inbound API)

use crate::domain::{Admission, OracleIndexes, RequestTicket, ResponseOutcome, SuretyResult};
use async_trait::async_trait;
use shared_types::{Address, Amount, FlightKey, FlightStatus};

/// Primary surety API
///
/// Every mutating call takes the caller identity first and checks the
/// operational gate before anything else (except `set_operational`).
#[async_trait]
pub trait SuretyApi: Send + Sync {
    /// Whether mutating operations are currently accepted
    async fn is_operational(&self) -> bool;

    /// Open or close the gate. Administrator only.
    async fn set_operational(&self, caller: Address, operational: bool) -> SuretyResult<()>;

    /// Nominate `candidate`; admission is immediate during bootstrap and
    /// by quorum afterwards
    async fn register_airline(
        &self,
        caller: Address,
        candidate: Address,
        name: String,
    ) -> SuretyResult<Admission>;

    /// Post the caller's stake
    async fn fund(&self, caller: Address, amount: Amount) -> SuretyResult<()>;

    async fn is_airline_registered(&self, airline: Address) -> bool;

    async fn is_airline_funded(&self, airline: Address) -> bool;

    /// Known airlines: registered members plus candidates awaiting votes
    async fn airline_count(&self) -> usize;

    /// Register a flight operated by the caller
    async fn register_flight(
        &self,
        caller: Address,
        code: String,
        timestamp: u64,
    ) -> SuretyResult<FlightKey>;

    /// Status of the most recently registered flight with `code`
    async fn check_flight_status(&self, code: String) -> FlightStatus;

    /// Buy insurance on the latest flight with `code`. Returns the
    /// accumulated premium.
    async fn buy(&self, caller: Address, code: String, amount: Amount) -> SuretyResult<Amount>;

    async fn get_insured_amount(&self, code: String, passenger: Address) -> Amount;

    async fn get_passenger_credit(&self, passenger: Address) -> Amount;

    /// Pay out the caller's credit
    async fn withdraw(&self, caller: Address) -> SuretyResult<Amount>;

    /// Join the oracle directory against `fee`
    async fn register_oracle(&self, caller: Address, fee: Amount) -> SuretyResult<OracleIndexes>;

    async fn get_my_indexes(&self, caller: Address) -> SuretyResult<OracleIndexes>;

    /// Ask oracles for a flight's status
    async fn fetch_flight_status(
        &self,
        caller: Address,
        airline: Address,
        code: String,
        timestamp: u64,
    ) -> SuretyResult<RequestTicket>;

    /// Report a status code for an open request
    async fn submit_oracle_response(
        &self,
        caller: Address,
        index: u8,
        airline: Address,
        code: String,
        timestamp: u64,
        status_code: u8,
    ) -> SuretyResult<ResponseOutcome>;

    /// Value held by the fund pool
    async fn pool_balance(&self) -> Amount;
}
