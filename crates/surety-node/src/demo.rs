//! # Demonstration Round
//!
//! Exercises the full cycle against a running node: fund the genesis
//! airline, register a flight, insure a passenger, ask the oracles, wait
//! for consensus and withdraw the credit.

use anyhow::{bail, Context, Result};
use shared_types::{format_address, Address, Amount, FlightStatus, ETHER};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use surety_engine::{SuretyApi, SuretyError};
use tokio::time::Instant;
use tracing::{info, warn};

/// What the round observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    pub flight_code: String,
    pub passenger: Address,
    pub status: FlightStatus,
    pub credit: Amount,
    pub withdrawn: Amount,
    pub requests: usize,
}

/// Fetches opened before giving up on consensus.
const MAX_REQUESTS: usize = 5;

/// Run one round as `admin`.
pub async fn run(
    api: &dyn SuretyApi,
    admin: Address,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<DemoReport> {
    if !api.is_airline_funded(admin).await {
        api.fund(admin, 10 * ETHER)
            .await
            .context("funding genesis airline")?;
    }

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let flight_code = format!("FS{}", timestamp % 1000);
    let flight = api
        .register_flight(admin, flight_code.clone(), timestamp)
        .await
        .context("registering demo flight")?;

    let passenger: Address = rand::random();
    api.buy(passenger, flight_code.clone(), ETHER)
        .await
        .context("buying insurance")?;
    info!(
        flight = %flight,
        passenger = %format_address(&passenger),
        "Demo passenger insured"
    );

    let mut requests = 0;
    let mut status = FlightStatus::Unknown;
    while !status.is_resolved() {
        if requests == MAX_REQUESTS {
            bail!("no consensus on {flight} after {requests} requests");
        }
        let ticket = api
            .fetch_flight_status(passenger, admin, flight_code.clone(), timestamp)
            .await
            .context("fetching flight status")?;
        requests += 1;
        info!(index = ticket.index, attempt = requests, "Status requested");

        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            status = api.check_flight_status(flight_code.clone()).await;
            if status.is_resolved() {
                break;
            }
            tokio::time::sleep(poll_interval).await;
        }
        if !status.is_resolved() {
            warn!(attempt = requests, "No consensus yet, asking again");
        }
    }

    let credit = api.get_passenger_credit(passenger).await;
    let withdrawn = match api.withdraw(passenger).await {
        Ok(amount) => amount,
        Err(SuretyError::NoCredit) => 0,
        Err(err) => return Err(err).context("withdrawing credit"),
    };
    info!(%status, credit, withdrawn, "Demo round complete");

    Ok(DemoReport {
        flight_code,
        passenger,
        status,
        credit,
        withdrawn,
        requests,
    })
}
