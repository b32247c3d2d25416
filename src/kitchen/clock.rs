//! Time source for the kitchen.
//!
//! All kitchen bookkeeping is done in whole epoch seconds. Injecting the clock keeps
//! decay and expiration testable without sleeping.

use std::time::{SystemTime, UNIX_EPOCH};

/// A source of "now" in epoch seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
