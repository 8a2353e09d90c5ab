//! Operational circuit breaker

use super::errors::{SuretyError, SuretyResult};
use shared_types::Address;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Process-wide operational flag, togglable only by the administrator.
pub struct AccessGate {
    administrator: Address,
    operational: AtomicBool,
}

impl AccessGate {
    /// New gate, initially open.
    pub fn new(administrator: Address) -> Self {
        Self {
            administrator,
            operational: AtomicBool::new(true),
        }
    }

    pub fn administrator(&self) -> Address {
        self.administrator
    }

    pub fn is_operational(&self) -> bool {
        self.operational.load(Ordering::Acquire)
    }

    /// Fails with `NotOperational` while the gate is closed.
    pub fn ensure_operational(&self) -> SuretyResult<()> {
        if self.is_operational() {
            Ok(())
        } else {
            Err(SuretyError::NotOperational)
        }
    }

    /// Set the flag. Returns true if the value changed.
    pub fn set_operational(&self, caller: &Address, operational: bool) -> SuretyResult<bool> {
        if *caller != self.administrator {
            return Err(SuretyError::Unauthorized);
        }
        let previous = self.operational.swap(operational, Ordering::AcqRel);
        let changed = previous != operational;
        if changed {
            info!(operational, "Operational status changed");
        }
        Ok(changed)
    }
}
