//! Cross-component integration tests.

pub mod concurrency;
pub mod e2e_choreography;
pub mod flows;

use shared_types::Address;
use std::sync::Arc;
use surety_engine::{
    KeccakIndexSource, NullPayout, RecordingEventSink, SuretyConfig, SuretyDependencies,
    SuretyService,
};

/// Service wired to a recording sink, as used by most flows.
pub type TestService = SuretyService<RecordingEventSink, KeccakIndexSource, NullPayout>;

/// Administrator and genesis airline in every fixture.
pub const OWNER: Address = [0x01; 20];

/// Deterministic test identity: `tag` in the first byte, `n` in the last.
pub fn account(tag: u8, n: u8) -> Address {
    let mut address = [0u8; 20];
    address[0] = tag;
    address[19] = n;
    address
}

pub fn airline(n: u8) -> Address {
    account(0xA1, n)
}

pub fn passenger(n: u8) -> Address {
    account(0xB0, n)
}

pub fn oracle(n: u8) -> Address {
    account(0x0C, n)
}

/// Fresh service with the default configuration and `OWNER` as administrator.
pub fn new_service() -> (Arc<TestService>, Arc<RecordingEventSink>) {
    let events = Arc::new(RecordingEventSink::new());
    let service = SuretyService::new(SuretyDependencies {
        events: events.clone(),
        index_source: Arc::new(KeccakIndexSource::new([0x5A; 32])),
        payout: Arc::new(NullPayout),
        config: SuretyConfig::with_administrator(OWNER),
    })
    .expect("default configuration is valid");
    (Arc::new(service), events)
}
