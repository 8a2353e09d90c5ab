//! Driven ports (Outbound dependencies)

use async_trait::async_trait;
use shared_bus::SuretyEvent;
use shared_types::{keccak256, Address, Amount, Hash};

/// Sink for engine events.
///
/// Called only after every lock is released.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: SuretyEvent);
}

/// Source of raw oracle indexes.
///
/// The result is reduced modulo the index space by the caller, so any `u8`
/// is acceptable.
pub trait IndexSource: Send + Sync {
    fn next_index(&self, seed: &Hash) -> u8;
}

/// Index source that hashes the seed with a salt.
#[derive(Clone, Debug, Default)]
pub struct KeccakIndexSource {
    salt: Hash,
}

impl KeccakIndexSource {
    pub fn new(salt: Hash) -> Self {
        Self { salt }
    }
}

impl IndexSource for KeccakIndexSource {
    fn next_index(&self, seed: &Hash) -> u8 {
        let mut input = [0u8; 64];
        input[..32].copy_from_slice(seed);
        input[32..].copy_from_slice(&self.salt);
        keccak256(&input)[0]
    }
}

/// External value transfer rail.
pub trait PayoutSink: Send + Sync {
    fn transfer(&self, to: &Address, amount: Amount) -> Result<(), String>;
}

/// Payout rail that accepts every transfer.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPayout;

impl PayoutSink for NullPayout {
    fn transfer(&self, _to: &Address, _amount: Amount) -> Result<(), String> {
        Ok(())
    }
}
