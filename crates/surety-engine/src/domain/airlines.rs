//! # Airline Registry
//!
//! Membership, funding and admission voting.
//!
//! While fewer than `bootstrap_limit` airlines are registered, a funded
//! member admits a candidate directly. After that each candidate needs
//! `ceil(registered / 2)` distinct funded nominators.
//!
//! ## Locking
//!
//! Votes are recorded under the candidate's nomination lock; the membership
//! write lock is taken inside it (order: candidate → membership). Nothing
//! takes a nomination lock while holding membership.

use super::config::required_votes;
use super::errors::{SuretyError, SuretyResult};
use super::keyed::KeyedStore;
use super::value_objects::Admission;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{format_address, Address, Amount};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// A federation member or pending candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub address: Address,
    pub name: String,
    pub registered: bool,
    pub funded: bool,
    /// Total stake posted across all `fund` calls.
    pub stake: Amount,
}

impl Airline {
    fn registered(address: Address, name: String) -> Self {
        Self {
            address,
            name,
            registered: true,
            funded: false,
            stake: 0,
        }
    }

    fn pending(address: Address, name: String) -> Self {
        Self {
            registered: false,
            ..Self::registered(address, name)
        }
    }
}

/// Open vote for a candidate.
#[derive(Clone, Debug, Default)]
pub struct Nomination {
    name: String,
    votes: BTreeSet<Address>,
}

#[derive(Default)]
struct Membership {
    airlines: HashMap<Address, Airline>,
    registered: usize,
}

impl Membership {
    fn is_registered(&self, address: &Address) -> bool {
        self.airlines.get(address).is_some_and(|a| a.registered)
    }

    fn can_nominate(&self, address: &Address) -> bool {
        self.airlines
            .get(address)
            .is_some_and(|a| a.registered && a.funded)
    }

    fn admit(&mut self, address: Address, name: String) {
        let airline = self
            .airlines
            .entry(address)
            .or_insert_with(|| Airline::pending(address, String::new()));
        if airline.name.is_empty() {
            airline.name = name;
        }
        if !airline.registered {
            airline.registered = true;
            self.registered += 1;
        }
    }
}

/// Membership set and pending admissions.
pub struct AirlineRegistry {
    membership: RwLock<Membership>,
    nominations: KeyedStore<Address, Nomination>,
    min_funding: Amount,
    bootstrap_limit: usize,
}

impl AirlineRegistry {
    /// Registry seeded with one registered, unfunded genesis airline.
    pub fn with_genesis(
        genesis: Address,
        name: impl Into<String>,
        min_funding: Amount,
        bootstrap_limit: usize,
    ) -> Self {
        let mut membership = Membership::default();
        membership
            .airlines
            .insert(genesis, Airline::registered(genesis, name.into()));
        membership.registered = 1;
        Self {
            membership: RwLock::new(membership),
            nominations: KeyedStore::new(),
            min_funding,
            bootstrap_limit,
        }
    }

    /// Nominate `candidate` on behalf of `nominator`.
    pub fn register_airline(
        &self,
        nominator: &Address,
        candidate: &Address,
        name: &str,
    ) -> SuretyResult<Admission> {
        {
            let mut membership = self.membership.write();
            if !membership.can_nominate(nominator) {
                return Err(SuretyError::NominatorNotFunded);
            }
            if membership.is_registered(candidate) {
                return Ok(Admission::AlreadyRegistered);
            }
            if membership.registered < self.bootstrap_limit {
                membership.admit(*candidate, name.to_string());
                info!(
                    airline = %format_address(candidate),
                    count = membership.registered,
                    "Airline admitted during bootstrap"
                );
                return Ok(Admission::Registered);
            }
        }

        let slot = self
            .nominations
            .get_or_insert_with(candidate, Nomination::default);
        let mut nomination = slot.lock();
        let mut membership = self.membership.write();

        if membership.is_registered(candidate) {
            // Lost a race with the vote that admitted the candidate.
            if nomination.votes.is_empty() {
                self.nominations.remove_slot(candidate, &slot);
            }
            return Ok(Admission::AlreadyRegistered);
        }
        if nomination.votes.contains(nominator) {
            debug!(
                candidate = %format_address(candidate),
                nominator = %format_address(nominator),
                "Duplicate vote ignored"
            );
            return Ok(Admission::AlreadyVoted);
        }

        nomination.votes.insert(*nominator);
        if nomination.name.is_empty() {
            nomination.name = name.to_string();
        }
        let votes = nomination.votes.len();
        let required = required_votes(membership.registered);

        if votes >= required {
            let name = std::mem::take(&mut nomination.name);
            membership.admit(*candidate, name);
            self.nominations.remove_slot(candidate, &slot);
            info!(
                airline = %format_address(candidate),
                votes,
                required,
                count = membership.registered,
                "Airline admitted by vote"
            );
            return Ok(Admission::Registered);
        }

        membership
            .airlines
            .entry(*candidate)
            .or_insert_with(|| Airline::pending(*candidate, nomination.name.clone()));
        debug!(
            candidate = %format_address(candidate),
            votes,
            required,
            "Nomination vote recorded"
        );
        Ok(Admission::VoteRecorded { votes, required })
    }

    /// Post stake for a known airline. Returns its total stake.
    pub fn fund(&self, airline: &Address, amount: Amount) -> SuretyResult<Amount> {
        let mut membership = self.membership.write();
        let record = membership
            .airlines
            .get_mut(airline)
            .ok_or(SuretyError::AirlineNotRegistered)?;
        if amount < self.min_funding {
            return Err(SuretyError::InsufficientFunding {
                paid: amount,
                minimum: self.min_funding,
            });
        }
        record.funded = true;
        record.stake = record.stake.saturating_add(amount);
        info!(
            airline = %format_address(airline),
            amount,
            stake = record.stake,
            "Airline funded"
        );
        Ok(record.stake)
    }

    pub fn is_registered(&self, address: &Address) -> bool {
        self.membership.read().is_registered(address)
    }

    pub fn is_funded(&self, address: &Address) -> bool {
        self.membership
            .read()
            .airlines
            .get(address)
            .is_some_and(|a| a.funded)
    }

    /// Fails with `AirlineNotRegistered` unless `address` is a member.
    pub fn ensure_registered(&self, address: &Address) -> SuretyResult<()> {
        if self.is_registered(address) {
            Ok(())
        } else {
            Err(SuretyError::AirlineNotRegistered)
        }
    }

    /// Known airlines: registered members plus candidates with a pending
    /// nomination.
    pub fn count(&self) -> usize {
        self.membership.read().airlines.len()
    }

    /// Registered members only. Admission thresholds are based on this.
    pub fn registered_count(&self) -> usize {
        self.membership.read().registered
    }

    pub fn airline(&self, address: &Address) -> Option<Airline> {
        self.membership.read().airlines.get(address).cloned()
    }

    /// Distinct votes recorded for a pending candidate.
    pub fn nomination_votes(&self, candidate: &Address) -> usize {
        self.nominations
            .get(candidate)
            .map_or(0, |slot| slot.lock().votes.len())
    }

    /// Registered member addresses, sorted.
    pub fn members(&self) -> Vec<Address> {
        let membership = self.membership.read();
        let mut members: Vec<Address> = membership
            .airlines
            .values()
            .filter(|a| a.registered)
            .map(|a| a.address)
            .collect();
        members.sort_unstable();
        members
    }
}
