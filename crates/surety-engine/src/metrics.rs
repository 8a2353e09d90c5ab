//! # Surety Metrics
//!
//! Prometheus counters for governance, underwriting and settlement.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! surety-engine = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `surety_airlines_admitted_total` - Airlines that became registered members
//! - `surety_policies_purchased_total` - Successful insurance purchases
//! - `surety_flights_resolved_total` - Flights finalized by consensus (by status)
//! - `surety_oracle_reports_total` - Oracle responses accepted into a tally
//! - `surety_payouts_total` - Successful credit withdrawals
//! - `surety_operations_rejected_total` - Failed operations (by error)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Airlines admitted, during bootstrap or by vote
    pub static ref AIRLINES_ADMITTED: IntCounter = register_int_counter!(
        "surety_airlines_admitted_total",
        "Total number of airlines admitted as registered members"
    )
    .expect("Failed to create AIRLINES_ADMITTED metric");

    /// Insurance purchases
    pub static ref POLICIES_PURCHASED: IntCounter = register_int_counter!(
        "surety_policies_purchased_total",
        "Total number of successful insurance purchases"
    )
    .expect("Failed to create POLICIES_PURCHASED metric");

    /// Flights finalized, labeled by agreed status
    pub static ref FLIGHTS_RESOLVED: IntCounterVec = register_int_counter_vec!(
        "surety_flights_resolved_total",
        "Total number of flights finalized by oracle consensus",
        &["status"]
    )
    .expect("Failed to create FLIGHTS_RESOLVED metric");

    /// Accepted oracle responses
    pub static ref ORACLE_REPORTS: IntCounter = register_int_counter!(
        "surety_oracle_reports_total",
        "Total number of oracle responses accepted into a tally"
    )
    .expect("Failed to create ORACLE_REPORTS metric");

    /// Successful withdrawals
    pub static ref PAYOUTS: IntCounter = register_int_counter!(
        "surety_payouts_total",
        "Total number of successful credit withdrawals"
    )
    .expect("Failed to create PAYOUTS metric");

    /// Rejected operations, labeled by error
    pub static ref OPERATIONS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "surety_operations_rejected_total",
        "Total number of rejected operations",
        &["error"]
    )
    .expect("Failed to create OPERATIONS_REJECTED metric");
}

/// Record an admitted airline
#[cfg(feature = "metrics")]
pub fn record_airline_admitted() {
    AIRLINES_ADMITTED.inc();
}

/// Record an insurance purchase
#[cfg(feature = "metrics")]
pub fn record_policy_purchased() {
    POLICIES_PURCHASED.inc();
}

/// Record a finalized flight with its status
#[cfg(feature = "metrics")]
pub fn record_flight_resolved(status: &str) {
    FLIGHTS_RESOLVED.with_label_values(&[status]).inc();
}

/// Record an accepted oracle response
#[cfg(feature = "metrics")]
pub fn record_oracle_report() {
    ORACLE_REPORTS.inc();
}

/// Record a successful payout
#[cfg(feature = "metrics")]
pub fn record_payout() {
    PAYOUTS.inc();
}

/// Record a rejected operation
#[cfg(feature = "metrics")]
pub fn record_rejected(error: &str) {
    OPERATIONS_REJECTED.with_label_values(&[error]).inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_airline_admitted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_policy_purchased() {}

#[cfg(not(feature = "metrics"))]
pub fn record_flight_resolved(_status: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_oracle_report() {}

#[cfg(not(feature = "metrics"))]
pub fn record_payout() {}

#[cfg(not(feature = "metrics"))]
pub fn record_rejected(_error: &str) {}
