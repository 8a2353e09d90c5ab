//! # Oracle Directory
//!
//! Registered oracle workers and their index triples. Indexes are drawn from
//! an external source and made distinct by probing forward through the
//! index space, so assignment terminates even with a constant source.

use super::config::INDEXES_PER_ORACLE;
use super::errors::{SuretyError, SuretyResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{format_address, keccak256, Address, Amount, Hash};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Index triple held by one oracle.
pub type OracleIndexes = [u8; INDEXES_PER_ORACLE];

/// A registered oracle worker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracle {
    pub address: Address,
    pub indexes: OracleIndexes,
}

impl Oracle {
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Oracle registrations.
pub struct OracleDirectory {
    oracles: RwLock<HashMap<Address, Oracle>>,
    registration_fee: Amount,
    index_space: u8,
    entropy: Hash,
    nonce: AtomicU64,
}

impl OracleDirectory {
    pub fn new(registration_fee: Amount, index_space: u8, entropy: Hash) -> Self {
        Self {
            oracles: RwLock::new(HashMap::new()),
            registration_fee,
            index_space,
            entropy,
            nonce: AtomicU64::new(0),
        }
    }

    pub fn registration_fee(&self) -> Amount {
        self.registration_fee
    }

    /// Register `identity` and assign its triple. `draw` maps a seed to a
    /// raw index; it is reduced modulo the index space here.
    pub fn register<F>(
        &self,
        identity: &Address,
        fee: Amount,
        mut draw: F,
    ) -> SuretyResult<OracleIndexes>
    where
        F: FnMut(&Hash) -> u8,
    {
        if fee < self.registration_fee {
            return Err(SuretyError::InsufficientFee {
                paid: fee,
                required: self.registration_fee,
            });
        }

        let mut oracles = self.oracles.write();
        if oracles.contains_key(identity) {
            return Err(SuretyError::AlreadyRegistered);
        }

        let mut indexes = [0u8; INDEXES_PER_ORACLE];
        for slot in 0..INDEXES_PER_ORACLE {
            let seed = self.next_seed(identity);
            let mut index = draw(&seed) % self.index_space;
            while indexes[..slot].contains(&index) {
                index = (index + 1) % self.index_space;
            }
            indexes[slot] = index;
        }

        oracles.insert(
            *identity,
            Oracle {
                address: *identity,
                indexes,
            },
        );
        info!(
            oracle = %format_address(identity),
            ?indexes,
            total = oracles.len(),
            "Oracle registered"
        );
        Ok(indexes)
    }

    /// `keccak256(identity ‖ nonce ‖ entropy)` with a fresh nonce.
    fn next_seed(&self, identity: &Address) -> Hash {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let mut input = Vec::with_capacity(20 + 8 + 32);
        input.extend_from_slice(identity);
        input.extend_from_slice(&nonce.to_be_bytes());
        input.extend_from_slice(&self.entropy);
        keccak256(&input)
    }

    pub fn indexes_of(&self, identity: &Address) -> SuretyResult<OracleIndexes> {
        self.oracles
            .read()
            .get(identity)
            .map(|o| o.indexes)
            .ok_or(SuretyError::NotRegistered)
    }

    pub fn is_registered(&self, identity: &Address) -> bool {
        self.oracles.read().contains_key(identity)
    }

    pub fn count(&self) -> usize {
        self.oracles.read().len()
    }
}
