//! Immutable sale parameters and the sale clock derived from them.

use serde::{Deserialize, Serialize};

use crate::error::PresaleError;
use crate::types::{Address, Balance, Timestamp};

/// One unit of native currency in smallest units (18 decimals).
pub const NATIVE_UNIT: Balance = 1_000_000_000_000_000_000;

/// Tokens granted per smallest unit of native currency in the reference deployment.
pub const REFERENCE_RATE: Balance = 950_000;

/// Length of the contribution window in the reference deployment, seconds.
pub const REFERENCE_WINDOW_SECS: u64 = 90;

/// Construction parameters. Nothing here changes after the presale is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleParams {
    /// Tokens per smallest unit of native currency.
    #[serde(with = "crate::types::balance_str")]
    pub rate: Balance,
    /// First second contributions are accepted (inclusive).
    pub opening_time: Timestamp,
    /// First second contributions are refused (exclusive end of window).
    pub closing_time: Timestamp,
    /// Cumulative native-currency cap per participant.
    #[serde(with = "crate::types::balance_str")]
    pub per_address_max: Balance,
    /// Aggregate native-currency cap across all participants.
    #[serde(with = "crate::types::balance_str")]
    pub hard_cap: Balance,
    /// Receives every accepted contribution immediately.
    pub receiver: Address,
    /// Account of the presale itself; holds the sale tokens in the token service.
    pub custody: Address,
    /// Privileged identity for whitelisting. `None` means the deployer.
    pub owner: Option<Address>,
}

impl Default for SaleParams {
    fn default() -> Self {
        Self {
            rate: REFERENCE_RATE,
            opening_time: 0,
            closing_time: REFERENCE_WINDOW_SECS,
            per_address_max: NATIVE_UNIT,
            hard_cap: 10 * NATIVE_UNIT,
            receiver: Address::ZERO,
            custody: Address::ZERO,
            owner: None,
        }
    }
}

impl SaleParams {
    /// Reference deployment: 950k rate, 1 unit per address, 10 units hard cap,
    /// window opening at `opening_time` and lasting 90 seconds.
    pub fn reference(receiver: Address, custody: Address, opening_time: Timestamp) -> Self {
        Self {
            opening_time,
            closing_time: opening_time.saturating_add(REFERENCE_WINDOW_SECS),
            receiver,
            custody,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), PresaleError> {
        if self.rate == 0 {
            return Err(PresaleError::InvalidParams("rate must be > 0".into()));
        }
        if self.closing_time <= self.opening_time {
            return Err(PresaleError::InvalidParams("closing_time <= opening_time".into()));
        }
        if self.per_address_max == 0 || self.hard_cap == 0 {
            return Err(PresaleError::InvalidParams("caps must be > 0".into()));
        }
        if self.per_address_max > self.hard_cap {
            return Err(PresaleError::InvalidParams("per_address_max > hard_cap".into()));
        }
        if self.receiver == Address::ZERO {
            return Err(PresaleError::InvalidParams("receiver must be set".into()));
        }
        if self.custody == Address::ZERO {
            return Err(PresaleError::InvalidParams("custody must be set".into()));
        }
        // The largest entitlement must be representable.
        self.per_address_max
            .checked_mul(self.rate)
            .ok_or_else(|| PresaleError::InvalidParams("per_address_max * rate overflows".into()))?;
        Ok(())
    }

    pub fn window(&self) -> SaleWindow {
        SaleWindow { opening_time: self.opening_time, closing_time: self.closing_time }
    }
}

/// Stateless gate over `[opening_time, closing_time)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleWindow {
    pub opening_time: Timestamp,
    pub closing_time: Timestamp,
}

impl SaleWindow {
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.opening_time <= now && now < self.closing_time
    }

    pub fn has_closed(&self, now: Timestamp) -> bool {
        now >= self.closing_time
    }
}
