//! Surety Service - application layer
//!
//! Implements [`SuretyApi`] over a [`SuretyStore`]. Each operation runs its
//! domain work synchronously, collecting the events it caused, and publishes
//! them through the [`EventSink`] only after every lock has been released.

use crate::domain::{
    Admission, Airline, ConfigError, InsuranceLedger, OracleIndexes, RequestTicket, ResponseOutcome,
    SuretyConfig, SuretyError, SuretyResult, SuretyStore,
};
use crate::metrics;
use crate::ports::{EventSink, IndexSource, PayoutSink, SuretyApi};
use async_trait::async_trait;
use shared_bus::{Component, SuretyEvent};
use shared_types::{format_address, Address, Amount, FlightKey, FlightStatus};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Result of a domain step plus the events to publish for it.
type Outcome<T> = SuretyResult<(T, Vec<SuretyEvent>)>;

/// Surety Service
pub struct SuretyService<E, I, P>
where
    E: EventSink,
    I: IndexSource,
    P: PayoutSink,
{
    events: Arc<E>,
    index_source: Arc<I>,
    payout: Arc<P>,
    store: Arc<SuretyStore>,
    config: SuretyConfig,
}

/// Dependencies for SuretyService
pub struct SuretyDependencies<E, I, P> {
    pub events: Arc<E>,
    pub index_source: Arc<I>,
    pub payout: Arc<P>,
    pub config: SuretyConfig,
}

impl<E, I, P> SuretyService<E, I, P>
where
    E: EventSink,
    I: IndexSource,
    P: PayoutSink,
{
    /// Create a service with a fresh store built from `deps.config`.
    pub fn new(deps: SuretyDependencies<E, I, P>) -> Result<Self, ConfigError> {
        let store = Arc::new(SuretyStore::new(&deps.config)?);
        Ok(Self::with_store(deps, store))
    }

    /// Create a service over an existing store.
    pub fn with_store(deps: SuretyDependencies<E, I, P>, store: Arc<SuretyStore>) -> Self {
        info!(
            administrator = %format_address(&deps.config.administrator),
            genesis = %format_address(&deps.config.genesis_airline),
            "Surety service started"
        );
        Self {
            events: deps.events,
            index_source: deps.index_source,
            payout: deps.payout,
            store,
            config: deps.config,
        }
    }

    pub fn store(&self) -> &Arc<SuretyStore> {
        &self.store
    }

    pub fn config(&self) -> &SuretyConfig {
        &self.config
    }

    // === EXTRA READS ===

    pub fn airline(&self, address: &Address) -> Option<Airline> {
        self.store.airlines.airline(address)
    }

    /// Registered members, excluding pending candidates.
    pub fn member_count(&self) -> usize {
        self.store.airlines.registered_count()
    }

    pub fn nomination_votes(&self, candidate: &Address) -> usize {
        self.store.airlines.nomination_votes(candidate)
    }

    pub fn flight_status(&self, key: &FlightKey) -> Option<FlightStatus> {
        self.store.flights.status(key)
    }

    pub fn flight_key_for(&self, code: &str) -> Option<FlightKey> {
        self.store.flights.key_for_code(code)
    }

    pub fn oracle_count(&self) -> usize {
        self.store.oracles.count()
    }

    pub fn is_oracle_registered(&self, oracle: &Address) -> bool {
        self.store.oracles.is_registered(oracle)
    }

    // === INTERNALS ===

    async fn publish_all(&self, events: Vec<SuretyEvent>) {
        for event in events {
            self.events.publish(event).await;
        }
    }

    /// Publish on success, count and log on failure.
    async fn finish<T>(&self, operation: &'static str, outcome: Outcome<T>) -> SuretyResult<T> {
        match outcome {
            Ok((value, events)) => {
                self.publish_all(events).await;
                Ok(value)
            }
            Err(err) => {
                metrics::record_rejected(err.label());
                debug!(operation, error = %err, "Operation rejected");
                Err(err)
            }
        }
    }

    fn gate(&self) -> SuretyResult<()> {
        self.store.gate.ensure_operational()
    }

    fn do_register_airline(
        &self,
        caller: &Address,
        candidate: &Address,
        name: &str,
    ) -> Outcome<Admission> {
        self.gate()?;
        let admission = self
            .store
            .airlines
            .register_airline(caller, candidate, name)?;

        let events = match &admission {
            Admission::Registered => {
                metrics::record_airline_admitted();
                let name = self
                    .store
                    .airlines
                    .airline(candidate)
                    .map(|a| a.name)
                    .unwrap_or_default();
                vec![SuretyEvent::AirlineRegistered {
                    airline: *candidate,
                    name,
                }]
            }
            Admission::VoteRecorded { votes, required } => vec![SuretyEvent::AirlineNominated {
                candidate: *candidate,
                nominator: *caller,
                votes: *votes,
                required: *required,
            }],
            Admission::AlreadyVoted | Admission::AlreadyRegistered => Vec::new(),
        };
        Ok((admission, events))
    }

    fn do_fund(&self, caller: &Address, amount: Amount) -> Outcome<()> {
        self.gate()?;
        self.store.airlines.fund(caller, amount)?;
        self.store.ledger.deposit(amount);
        Ok((
            (),
            vec![SuretyEvent::AirlineFunded {
                airline: *caller,
                amount,
            }],
        ))
    }

    fn do_register_flight(
        &self,
        caller: &Address,
        code: String,
        timestamp: u64,
    ) -> Outcome<FlightKey> {
        self.gate()?;
        self.store.airlines.ensure_registered(caller)?;
        let key = FlightKey::new(*caller, code, timestamp);
        let events = if self.store.flights.register(&key) {
            vec![SuretyEvent::FlightRegistered { flight: key.clone() }]
        } else {
            Vec::new()
        };
        Ok((key, events))
    }

    fn do_buy(&self, caller: &Address, code: &str, amount: Amount) -> Outcome<Amount> {
        self.gate()?;
        InsuranceLedger::check_premium(amount)?;
        let flights = &self.store.flights;
        let key = flights.key_for_code(code).ok_or(SuretyError::UnknownFlight)?;
        if flights.status(&key).is_some_and(FlightStatus::is_resolved) {
            return Err(SuretyError::FlightResolved);
        }
        let total = self.store.ledger.buy(caller, &key, amount)?;
        metrics::record_policy_purchased();
        Ok((
            total,
            vec![SuretyEvent::InsurancePurchased {
                passenger: *caller,
                flight: key,
                amount,
                total,
            }],
        ))
    }

    fn do_withdraw(&self, caller: &Address) -> Outcome<Amount> {
        self.gate()?;
        let amount = self
            .store
            .ledger
            .withdraw(caller, |to, amount| self.payout.transfer(to, amount))?;
        metrics::record_payout();
        Ok((
            amount,
            vec![SuretyEvent::CreditWithdrawn {
                passenger: *caller,
                amount,
            }],
        ))
    }

    fn do_register_oracle(&self, caller: &Address, fee: Amount) -> Outcome<OracleIndexes> {
        self.gate()?;
        let indexes = self
            .store
            .oracles
            .register(caller, fee, |seed| self.index_source.next_index(seed))?;
        self.store.ledger.deposit(fee);
        Ok((
            indexes,
            vec![SuretyEvent::OracleRegistered {
                oracle: *caller,
                indexes,
            }],
        ))
    }

    fn do_fetch(&self, caller: &Address, flight: FlightKey) -> Outcome<RequestTicket> {
        self.gate()?;
        if !self.store.flights.contains(&flight) {
            return Err(SuretyError::UnknownFlight);
        }
        let ticket = self
            .store
            .coordinator
            .open_request(caller, &flight, |seed| self.index_source.next_index(seed));
        let event = SuretyEvent::OracleRequest {
            request_id: ticket.request_id,
            index: ticket.index,
            flight,
        };
        Ok((ticket, vec![event]))
    }

    fn do_submit(
        &self,
        caller: &Address,
        index: u8,
        flight: FlightKey,
        status_code: u8,
    ) -> Outcome<ResponseOutcome> {
        self.gate()?;
        let status = FlightStatus::from_code(status_code)
            .ok_or(SuretyError::InvalidStatusCode(status_code))?;
        let store = &self.store;
        let submission = store.coordinator.submit(
            caller,
            index,
            &flight,
            status,
            &store.oracles,
            &store.flights,
            &store.ledger,
        )?;

        let mut events = Vec::new();
        if submission.outcome != ResponseOutcome::Duplicate {
            metrics::record_oracle_report();
            events.push(SuretyEvent::OracleReport {
                oracle: *caller,
                index,
                flight: flight.clone(),
                status,
            });
        }
        if let ResponseOutcome::Resolved(agreed) = submission.outcome {
            if submission.finalized {
                metrics::record_flight_resolved(agreed.name());
            }
            events.push(SuretyEvent::FlightStatusInfo {
                flight: flight.clone(),
                status: agreed,
            });
            events.extend(submission.credits.iter().map(|credit| {
                SuretyEvent::PassengerCredited {
                    passenger: credit.passenger,
                    flight: flight.clone(),
                    amount: credit.amount,
                }
            }));
        }
        Ok((submission.outcome, events))
    }
}

#[async_trait]
impl<E, I, P> SuretyApi for SuretyService<E, I, P>
where
    E: EventSink,
    I: IndexSource,
    P: PayoutSink,
{
    async fn is_operational(&self) -> bool {
        self.store.gate.is_operational()
    }

    async fn set_operational(&self, caller: Address, operational: bool) -> SuretyResult<()> {
        let outcome = self
            .store
            .gate
            .set_operational(&caller, operational)
            .map(|changed| {
                let events = if changed {
                    vec![SuretyEvent::OperationalStatusChanged { operational }]
                } else {
                    Vec::new()
                };
                ((), events)
            });
        self.finish("set_operational", outcome).await
    }

    async fn register_airline(
        &self,
        caller: Address,
        candidate: Address,
        name: String,
    ) -> SuretyResult<Admission> {
        let outcome = self.do_register_airline(&caller, &candidate, &name);
        self.finish("register_airline", outcome).await
    }

    async fn fund(&self, caller: Address, amount: Amount) -> SuretyResult<()> {
        let outcome = self.do_fund(&caller, amount);
        self.finish("fund", outcome).await
    }

    async fn is_airline_registered(&self, airline: Address) -> bool {
        self.store.airlines.is_registered(&airline)
    }

    async fn is_airline_funded(&self, airline: Address) -> bool {
        self.store.airlines.is_funded(&airline)
    }

    async fn airline_count(&self) -> usize {
        self.store.airlines.count()
    }

    async fn register_flight(
        &self,
        caller: Address,
        code: String,
        timestamp: u64,
    ) -> SuretyResult<FlightKey> {
        let outcome = self.do_register_flight(&caller, code, timestamp);
        self.finish("register_flight", outcome).await
    }

    async fn check_flight_status(&self, code: String) -> FlightStatus {
        self.store.flights.check_status(&code)
    }

    async fn buy(&self, caller: Address, code: String, amount: Amount) -> SuretyResult<Amount> {
        let outcome = self.do_buy(&caller, &code, amount);
        self.finish("buy", outcome).await
    }

    async fn get_insured_amount(&self, code: String, passenger: Address) -> Amount {
        self.store
            .flights
            .key_for_code(&code)
            .map_or(0, |key| self.store.ledger.insured_amount(&key, &passenger))
    }

    async fn get_passenger_credit(&self, passenger: Address) -> Amount {
        self.store.ledger.credit_of(&passenger)
    }

    async fn withdraw(&self, caller: Address) -> SuretyResult<Amount> {
        let outcome = self.do_withdraw(&caller);
        if let Err(SuretyError::PayoutFailed(reason)) = &outcome {
            error!(passenger = %format_address(&caller), %reason, "Payout rail failure");
            self.events
                .publish(SuretyEvent::CriticalError {
                    component: Component::InsuranceLedger,
                    error: format!("payout to {} failed: {reason}", format_address(&caller)),
                })
                .await;
        }
        self.finish("withdraw", outcome).await
    }

    async fn register_oracle(&self, caller: Address, fee: Amount) -> SuretyResult<OracleIndexes> {
        let outcome = self.do_register_oracle(&caller, fee);
        self.finish("register_oracle", outcome).await
    }

    async fn get_my_indexes(&self, caller: Address) -> SuretyResult<OracleIndexes> {
        self.store.oracles.indexes_of(&caller)
    }

    async fn fetch_flight_status(
        &self,
        caller: Address,
        airline: Address,
        code: String,
        timestamp: u64,
    ) -> SuretyResult<RequestTicket> {
        let outcome = self.do_fetch(&caller, FlightKey::new(airline, code, timestamp));
        self.finish("fetch_flight_status", outcome).await
    }

    async fn submit_oracle_response(
        &self,
        caller: Address,
        index: u8,
        airline: Address,
        code: String,
        timestamp: u64,
        status_code: u8,
    ) -> SuretyResult<ResponseOutcome> {
        let flight = FlightKey::new(airline, code, timestamp);
        let outcome = self.do_submit(&caller, index, flight, status_code);
        self.finish("submit_oracle_response", outcome).await
    }

    async fn pool_balance(&self) -> Amount {
        self.store.ledger.pool().balance()
    }
}
