//! Settlement controller: Collecting -> Finalized, then one withdrawal per participant.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::PresaleError;
use crate::params::SaleWindow;
use crate::types::{Address, Balance, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Collecting,
    Finalized,
}

#[derive(Clone, Debug)]
pub struct Settlement {
    phase: Phase,
    finalized_at: Option<Timestamp>,
    withdrawn: BTreeSet<Address>,
}

impl Default for Settlement {
    fn default() -> Self {
        Self { phase: Phase::Collecting, finalized_at: None, withdrawn: BTreeSet::new() }
    }
}

impl Settlement {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finalized(&self) -> bool {
        self.phase == Phase::Finalized
    }

    pub fn finalized_at(&self) -> Option<Timestamp> {
        self.finalized_at
    }

    pub fn has_withdrawn(&self, who: &Address) -> bool {
        self.withdrawn.contains(who)
    }

    pub fn withdrawals(&self) -> usize {
        self.withdrawn.len()
    }

    /// One-way transition. Fails if already finalized or the window has not closed.
    pub fn finalize(&mut self, window: &SaleWindow, now: Timestamp) -> Result<(), PresaleError> {
        if self.phase == Phase::Finalized {
            return Err(PresaleError::AlreadyFinalized);
        }
        if !window.has_closed(now) {
            return Err(PresaleError::SaleNotClosed);
        }
        self.phase = Phase::Finalized;
        self.finalized_at = Some(now);
        Ok(())
    }

    /// Mark `who` as withdrawn for `entitlement` tokens. Must be undone with
    /// [`Settlement::cancel_withdrawal`] if the token transfer fails.
    pub fn begin_withdrawal(&mut self, who: Address, entitlement: Balance) -> Result<Balance, PresaleError> {
        if self.phase != Phase::Finalized {
            return Err(PresaleError::NotFinalized);
        }
        if self.withdrawn.contains(&who) {
            return Err(PresaleError::AlreadyWithdrawn);
        }
        if entitlement == 0 {
            return Err(PresaleError::NothingToWithdraw);
        }
        self.withdrawn.insert(who);
        Ok(entitlement)
    }

    pub fn cancel_withdrawal(&mut self, who: &Address) {
        self.withdrawn.remove(who);
    }
}
