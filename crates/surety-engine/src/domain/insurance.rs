//! # Insurance Ledger
//!
//! Premium escrow per `(passenger, flight)`, credits after settlement, and
//! the running fund pool.
//!
//! ## Invariants
//!
//! - A flight is settled at most once (per-flight `settled` marker).
//! - Purchases and settlement for one flight serialize on the flight's
//!   policy lock; credits are added under the passenger lock inside it
//!   (order: flight → passenger).
//! - `withdraw` zeroes the balance before calling the payout port and
//!   releases the passenger lock first, so a re-entrant payout sees zero.

use super::config::{credit_for, MAX_PREMIUM};
use super::errors::{SuretyError, SuretyResult};
use super::keyed::KeyedStore;
use super::value_objects::Credit;
use parking_lot::Mutex;
use shared_types::{format_address, Address, Amount, FlightKey, FlightStatus};
use std::collections::HashMap;
use tracing::{info, warn};

/// Policies written against one flight.
#[derive(Clone, Debug, Default)]
pub struct FlightPolicies {
    premiums: HashMap<Address, Amount>,
    settled: Option<FlightStatus>,
}

/// Value that entered the system minus payouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FundPool {
    pub deposited: Amount,
    pub paid_out: Amount,
}

impl FundPool {
    pub fn balance(&self) -> Amount {
        self.deposited.saturating_sub(self.paid_out)
    }
}

/// Premium escrow and passenger credits.
pub struct InsuranceLedger {
    policies: KeyedStore<FlightKey, FlightPolicies>,
    credits: KeyedStore<Address, Amount>,
    pool: Mutex<FundPool>,
}

impl InsuranceLedger {
    pub fn new() -> Self {
        Self {
            policies: KeyedStore::new(),
            credits: KeyedStore::new(),
            pool: Mutex::new(FundPool::default()),
        }
    }

    /// Escrow `amount` for `passenger` on `flight`. Returns the accumulated
    /// premium. The caller checks that the flight exists.
    pub fn buy(
        &self,
        passenger: &Address,
        flight: &FlightKey,
        amount: Amount,
    ) -> SuretyResult<Amount> {
        Self::check_premium(amount)?;

        let slot = self.policies.get_or_insert_with(flight, FlightPolicies::default);
        let mut policies = slot.lock();
        if policies.settled.is_some() {
            return Err(SuretyError::FlightResolved);
        }
        let premium = policies.premiums.entry(*passenger).or_insert(0);
        *premium = premium.saturating_add(amount);
        let total = *premium;
        drop(policies);

        self.deposit(amount);
        info!(
            passenger = %format_address(passenger),
            flight = %flight,
            amount,
            total,
            "Insurance purchased"
        );
        Ok(total)
    }

    /// Premium bounds, checked before the flight lookup.
    pub fn check_premium(amount: Amount) -> SuretyResult<()> {
        if amount == 0 {
            return Err(SuretyError::ZeroPremium);
        }
        if amount > MAX_PREMIUM {
            return Err(SuretyError::PremiumExceedsCap {
                amount,
                cap: MAX_PREMIUM,
            });
        }
        Ok(())
    }

    pub fn insured_amount(&self, flight: &FlightKey, passenger: &Address) -> Amount {
        self.policies
            .get(flight)
            .and_then(|slot| slot.lock().premiums.get(passenger).copied())
            .unwrap_or(0)
    }

    pub fn is_settled(&self, flight: &FlightKey) -> bool {
        self.policies
            .get(flight)
            .is_some_and(|slot| slot.lock().settled.is_some())
    }

    /// Settle `flight` once. On `LateAirline` every policy holder is
    /// credited `premium * 3 / 2`; the granted credits are returned sorted by
    /// passenger. A second call returns nothing.
    pub fn on_flight_resolved(&self, flight: &FlightKey, status: FlightStatus) -> Vec<Credit> {
        let slot = self.policies.get_or_insert_with(flight, FlightPolicies::default);
        let mut policies = slot.lock();
        if policies.settled.is_some() {
            return Vec::new();
        }
        policies.settled = Some(status);

        if status != FlightStatus::LateAirline {
            info!(flight = %flight, %status, "Flight settled without payout");
            return Vec::new();
        }

        let mut granted: Vec<Credit> = policies
            .premiums
            .iter()
            .map(|(passenger, premium)| Credit {
                passenger: *passenger,
                amount: credit_for(*premium),
            })
            .collect();
        granted.sort_unstable_by(|a, b| a.passenger.cmp(&b.passenger));

        for credit in &granted {
            let balance = self.credits.get_or_insert_with(&credit.passenger, || 0);
            let mut balance = balance.lock();
            *balance = balance.saturating_add(credit.amount);
        }
        info!(flight = %flight, credited = granted.len(), "Passengers credited");
        granted
    }

    pub fn credit_of(&self, passenger: &Address) -> Amount {
        self.credits.snapshot(passenger).unwrap_or(0)
    }

    /// Pay out the passenger's whole credit through `transfer`.
    pub fn withdraw<F>(&self, passenger: &Address, transfer: F) -> SuretyResult<Amount>
    where
        F: FnOnce(&Address, Amount) -> Result<(), String>,
    {
        let slot = self.credits.get(passenger).ok_or(SuretyError::NoCredit)?;
        let amount = {
            let mut balance = slot.lock();
            if *balance == 0 {
                return Err(SuretyError::NoCredit);
            }
            std::mem::take(&mut *balance)
        };

        if let Err(reason) = transfer(passenger, amount) {
            let mut balance = slot.lock();
            *balance = balance.saturating_add(amount);
            warn!(
                passenger = %format_address(passenger),
                amount,
                %reason,
                "Payout failed, credit restored"
            );
            return Err(SuretyError::PayoutFailed(reason));
        }

        self.pool.lock().paid_out += amount;
        info!(passenger = %format_address(passenger), amount, "Credit withdrawn");
        Ok(amount)
    }

    /// Record value entering the pool (stakes, premiums, fees).
    pub fn deposit(&self, amount: Amount) {
        let mut pool = self.pool.lock();
        pool.deposited = pool.deposited.saturating_add(amount);
    }

    pub fn pool(&self) -> FundPool {
        *self.pool.lock()
    }
}

impl Default for InsuranceLedger {
    fn default() -> Self {
        Self::new()
    }
}
