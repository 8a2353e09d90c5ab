//! # Simulated Oracle Pool
//!
//! Each worker registers with the engine, subscribes to the `Oracles` topic
//! and answers every `OracleRequest` whose active index it holds.

use crate::config::OracleBehaviour;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, SuretyEvent, Subscription};
use shared_types::{format_address, Address, Amount, FlightKey, FlightStatus};
use std::sync::Arc;
use surety_engine::{SuretyApi, SuretyError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};

/// One simulated oracle.
pub struct OracleWorker {
    address: Address,
    indexes: [u8; 3],
    behaviour: OracleBehaviour,
    rng: StdRng,
}

impl OracleWorker {
    pub fn new(address: Address, indexes: [u8; 3], behaviour: OracleBehaviour) -> Self {
        Self {
            address,
            indexes,
            behaviour,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn indexes(&self) -> [u8; 3] {
        self.indexes
    }

    /// Status to report for the next request.
    fn pick_status(&mut self) -> FlightStatus {
        match self.behaviour {
            OracleBehaviour::Fixed(status) => status,
            OracleBehaviour::Random => FlightStatus::ALL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or_default(),
        }
    }

    /// Answer one event. Returns true if a response was submitted.
    pub async fn handle(&mut self, api: &dyn SuretyApi, event: &SuretyEvent) -> bool {
        let SuretyEvent::OracleRequest { index, flight, .. } = event else {
            return false;
        };
        if !self.indexes.contains(index) {
            return false;
        }
        let status = self.pick_status();
        self.respond(api, *index, flight, status).await;
        true
    }

    async fn respond(
        &self,
        api: &dyn SuretyApi,
        index: u8,
        flight: &FlightKey,
        status: FlightStatus,
    ) {
        let result = api
            .submit_oracle_response(
                self.address,
                index,
                flight.airline,
                flight.code.clone(),
                flight.timestamp,
                status.code(),
            )
            .await;
        match result {
            Ok(outcome) => debug!(flight = %flight, %status, ?outcome, "Response submitted"),
            // Quorum was reached before this worker answered.
            Err(SuretyError::RequestNotOpen) => {
                debug!(flight = %flight, "Request already closed")
            }
            Err(err) => warn!(flight = %flight, error = %err, "Response rejected"),
        }
    }

    /// Serve requests from `subscription` until shutdown.
    pub async fn run(
        mut self,
        api: Arc<dyn SuretyApi>,
        mut subscription: Subscription,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => {
                        self.handle(api.as_ref(), &event).await;
                    }
                    None => break,
                },
                _ = shutdown.changed() => break,
            }
        }
        debug!("Oracle worker stopped");
    }
}

/// Register `count` oracles and spawn a worker task for each.
pub async fn spawn_pool(
    api: Arc<dyn SuretyApi>,
    bus: &InMemoryEventBus,
    count: usize,
    fee: Amount,
    behaviour: OracleBehaviour,
    shutdown: watch::Receiver<bool>,
) -> Result<Vec<JoinHandle<()>>, SuretyError> {
    let mut handles = Vec::with_capacity(count);
    for n in 0..count {
        let address = oracle_address(n);
        let indexes = api.register_oracle(address, fee).await?;
        let worker = OracleWorker::new(address, indexes, behaviour);
        let subscription = bus.subscribe(EventFilter::topics(vec![EventTopic::Oracles]));
        let span = surety_telemetry::component_span!(
            "oracle_worker",
            oracle = %format_address(&address)
        );
        handles.push(tokio::spawn(
            worker
                .run(api.clone(), subscription, shutdown.clone())
                .instrument(span),
        ));
    }
    info!(count, "Oracle pool started");
    Ok(handles)
}

/// Deterministic address for the `n`th simulated oracle.
pub fn oracle_address(n: usize) -> Address {
    let mut address = [0u8; 20];
    address[0] = 0x0A;
    address[12..].copy_from_slice(&(n as u64).to_be_bytes());
    address
}
