//! Collaborators the presale talks to but does not own.
//!
//! All monetary side-effects and the notion of "now" go through these traits so
//! that a runtime (or a test) can plug in its own ledger, token and clock.
//! Any call into `ValueTransfer` or `TokenService` may re-enter the presale
//! before it returns.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::TransferError;
use crate::types::{Address, Balance, Timestamp};

/// Time source gating the sale window.
pub trait Clock: Send + Sync + 'static {
    /// Current UNIX time (seconds).
    fn now(&self) -> Timestamp;
}

/// Native-currency transfer primitive. Moves funds held by the presale.
pub trait ValueTransfer: Send + Sync + 'static {
    fn send(&self, to: Address, amount: Balance) -> Result<(), TransferError>;
}

/// Fungible token the sale distributes. `transfer` debits the presale's own holding.
pub trait TokenService: Send + Sync + 'static {
    fn transfer(&self, to: Address, amount: Balance) -> Result<(), TransferError>;

    fn balance_of(&self, who: Address) -> Balance;
}

/// Wall-clock time source.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_past_2020() {
        assert!(SystemClock.now() > 1_577_836_800);
    }
}
