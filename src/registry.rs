//! Admission registry: owner-controlled allow-list of participants.
//!
//! The set only grows; there is no removal.

use std::collections::BTreeSet;

use crate::error::PresaleError;
use crate::types::Address;

#[derive(Clone, Debug)]
pub struct AdmissionRegistry {
    owner: Address,
    members: BTreeSet<Address>,
}

impl AdmissionRegistry {
    pub fn new(owner: Address) -> Self {
        Self { owner, members: BTreeSet::new() }
    }

    fn require_owner(&self, caller: Address) -> Result<(), PresaleError> {
        if caller != self.owner {
            return Err(PresaleError::Unauthorized);
        }
        Ok(())
    }

    /// Admit `who`. Returns `true` if it was not already admitted.
    pub fn whitelist(&mut self, caller: Address, who: Address) -> Result<bool, PresaleError> {
        self.require_owner(caller)?;
        Ok(self.members.insert(who))
    }

    /// Admit every identity in `batch`, or none if the caller is not the owner.
    /// Returns the identities that were newly added, in input order.
    pub fn whitelist_many(&mut self, caller: Address, batch: &[Address]) -> Result<Vec<Address>, PresaleError> {
        self.require_owner(caller)?;
        Ok(batch.iter().copied().filter(|who| self.members.insert(*who)).collect())
    }

    pub fn is_whitelisted(&self, who: &Address) -> bool {
        self.members.contains(who)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(x: u8) -> Address {
        let mut a = [0u8; 20];
        a[0] = x;
        Address(a)
    }

    #[test]
    fn owner_whitelists_idempotently() {
        let mut reg = AdmissionRegistry::new(addr(1));
        assert!(reg.whitelist(addr(1), addr(2)).unwrap());
        assert!(!reg.whitelist(addr(1), addr(2)).unwrap());
        assert!(reg.is_whitelisted(&addr(2)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn non_owner_is_rejected() {
        let mut reg = AdmissionRegistry::new(addr(1));
        assert_eq!(reg.whitelist(addr(9), addr(2)), Err(PresaleError::Unauthorized));
        assert!(!reg.is_whitelisted(&addr(2)));
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let mut reg = AdmissionRegistry::new(addr(1));
        let batch = [addr(2), addr(3), addr(4)];
        assert_eq!(reg.whitelist_many(addr(9), &batch), Err(PresaleError::Unauthorized));
        assert!(reg.is_empty());

        reg.whitelist(addr(1), addr(3)).unwrap();
        let added = reg.whitelist_many(addr(1), &batch).unwrap();
        assert_eq!(added, vec![addr(2), addr(4)]);
        assert!(batch.iter().all(|a| reg.is_whitelisted(a)));
    }
}
