//! Contribution ledger: per-participant and aggregate native-currency accounting.
//!
//! Pure bookkeeping. Callers decide when to credit and when to reverse a credit;
//! the ledger only guarantees that `sum(contributed) == total_raised`, that no
//! participant exceeds `per_address_max` and that `total_raised <= hard_cap`.

use std::collections::BTreeMap;

use crate::error::PresaleError;
use crate::types::{Address, Balance};

/// Result of a successful credit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Credit {
    /// Participant's cumulative contribution after the credit.
    pub participant_total: Balance,
    /// Aggregate raised after the credit.
    pub total_raised: Balance,
}

#[derive(Clone, Debug)]
pub struct ContributionLedger {
    rate: Balance,
    per_address_max: Balance,
    hard_cap: Balance,
    contributed: BTreeMap<Address, Balance>,
    total_raised: Balance,
}

impl ContributionLedger {
    pub fn new(rate: Balance, per_address_max: Balance, hard_cap: Balance) -> Self {
        Self { rate, per_address_max, hard_cap, contributed: BTreeMap::new(), total_raised: 0 }
    }

    pub fn contributed(&self, who: &Address) -> Balance {
        self.contributed.get(who).copied().unwrap_or(0)
    }

    pub fn total_raised(&self) -> Balance {
        self.total_raised
    }

    /// Remaining room under the hard cap.
    pub fn headroom(&self) -> Balance {
        self.hard_cap.saturating_sub(self.total_raised)
    }

    /// Number of identities with a non-zero contribution.
    pub fn participants(&self) -> usize {
        self.contributed.len()
    }

    /// Token-denominated entitlement: `contributed * rate`.
    pub fn entitlement(&self, who: &Address) -> Result<Balance, PresaleError> {
        self.contributed(who).checked_mul(self.rate).ok_or(PresaleError::MathOverflow)
    }

    /// Verify that `amount` fits both caps without mutating anything.
    pub fn check(&self, who: &Address, amount: Balance) -> Result<Credit, PresaleError> {
        if amount == 0 {
            return Err(PresaleError::ZeroAmount);
        }
        let participant_total = self
            .contributed(who)
            .checked_add(amount)
            .ok_or(PresaleError::ExceedsPerAddressCap)?;
        if participant_total > self.per_address_max {
            return Err(PresaleError::ExceedsPerAddressCap);
        }
        let total_raised = self.total_raised.checked_add(amount).ok_or(PresaleError::ExceedsHardCap)?;
        if total_raised > self.hard_cap {
            return Err(PresaleError::ExceedsHardCap);
        }
        Ok(Credit { participant_total, total_raised })
    }

    /// Check and commit a contribution.
    pub fn credit(&mut self, who: Address, amount: Balance) -> Result<Credit, PresaleError> {
        let credit = self.check(&who, amount)?;
        self.contributed.insert(who, credit.participant_total);
        self.total_raised = credit.total_raised;
        Ok(credit)
    }

    /// Undo a previously committed `credit(who, amount)`.
    pub fn reverse(&mut self, who: Address, amount: Balance) -> Result<(), PresaleError> {
        let current = self.contributed(&who);
        let remaining = current.checked_sub(amount).ok_or(PresaleError::MathOverflow)?;
        let total = self.total_raised.checked_sub(amount).ok_or(PresaleError::MathOverflow)?;
        if remaining == 0 {
            self.contributed.remove(&who);
        } else {
            self.contributed.insert(who, remaining);
        }
        self.total_raised = total;
        Ok(())
    }
}
