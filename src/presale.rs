//! Presale engine: admission, contribution accounting, sale clock and settlement
//! behind a single serialized entry point.
//!
//! Every mutating call holds the execution lock for its whole duration, so calls
//! from different threads never interleave. The state lock is never held across
//! an external transfer: effects are committed first, the collaborator is called,
//! and the effect is compensated if the collaborator refuses. A collaborator may
//! call back into the presale on the same thread; such a callback observes the
//! committed state, but every mutating call is refused until the transfer has
//! settled, so nothing can build on an effect that may still be compensated.

use std::fmt;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::backend::{Clock, SystemClock, TokenService, ValueTransfer};
use crate::error::PresaleError;
use crate::events::{EventBus, PresaleEvent};
use crate::ledger::{ContributionLedger, Credit};
use crate::params::{SaleParams, SaleWindow};
use crate::registry::AdmissionRegistry;
use crate::settlement::{Phase, Settlement};
use crate::types::{Address, Balance, Timestamp};

/// Broadcast channel depth for live subscribers.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Read-only summary of the sale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub is_open: bool,
    pub total_raised: Balance,
    pub hard_cap_headroom: Balance,
    pub participants: usize,
    pub whitelisted: usize,
    pub withdrawals: usize,
    pub finalized_at: Option<Timestamp>,
}

struct State {
    registry: AdmissionRegistry,
    ledger: ContributionLedger,
    settlement: Settlement,
    /// Operation whose external transfer has not returned yet.
    in_flight: Option<&'static str>,
}

impl State {
    fn ensure_idle(&self) -> Result<(), PresaleError> {
        match self.in_flight {
            Some(op) => Err(PresaleError::ReentrantCall(op)),
            None => Ok(()),
        }
    }
}

pub struct Presale<T: TokenService, V: ValueTransfer, C: Clock = SystemClock> {
    params: SaleParams,
    window: SaleWindow,
    owner: Address,
    token: Arc<T>,
    bank: Arc<V>,
    clock: Arc<C>,
    exec: ReentrantMutex<()>,
    state: RwLock<State>,
    events: EventBus,
}

impl<T: TokenService, V: ValueTransfer, C: Clock> fmt::Debug for Presale<T, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.state.read();
        f.debug_struct("Presale")
            .field("owner", &self.owner)
            .field("custody", &self.params.custody)
            .field("phase", &st.settlement.phase())
            .field("total_raised", &st.ledger.total_raised())
            .finish()
    }
}

impl<T: TokenService, V: ValueTransfer, C: Clock> Presale<T, V, C> {
    /// Create a presale. The owner is `params.owner` or, if unset, the deployer.
    pub fn new(
        deployer: Address,
        params: SaleParams,
        token: Arc<T>,
        bank: Arc<V>,
        clock: Arc<C>,
    ) -> Result<Arc<Self>, PresaleError> {
        params.validate()?;
        let owner = params.owner.unwrap_or(deployer);
        let st = State {
            registry: AdmissionRegistry::new(owner),
            ledger: ContributionLedger::new(params.rate, params.per_address_max, params.hard_cap),
            settlement: Settlement::default(),
            in_flight: None,
        };
        info!(
            owner = %owner,
            receiver = %params.receiver,
            rate = %params.rate,
            opening_time = params.opening_time,
            closing_time = params.closing_time,
            "presale created"
        );
        Ok(Arc::new(Self {
            window: params.window(),
            params,
            owner,
            token,
            bank,
            clock,
            exec: ReentrantMutex::new(()),
            state: RwLock::new(st),
            events: EventBus::new(DEFAULT_EVENT_CAPACITY),
        }))
    }

    // ---------- Admission ----------

    pub fn whitelist(&self, caller: Address, identity: Address) -> Result<(), PresaleError> {
        let _ex = self.exec.lock();
        let added = {
            let mut st = self.state.write();
            st.ensure_idle()?;
            st.registry.whitelist(caller, identity)?
        };
        if added {
            info!(identity = %identity, "whitelisted");
            self.events.emit(PresaleEvent::Whitelisted { identity });
        }
        Ok(())
    }

    pub fn whitelist_many(&self, caller: Address, identities: &[Address]) -> Result<(), PresaleError> {
        let _ex = self.exec.lock();
        let added = {
            let mut st = self.state.write();
            st.ensure_idle()?;
            st.registry.whitelist_many(caller, identities)?
        };
        info!(requested = identities.len(), added = added.len(), "whitelisted batch");
        for identity in added {
            self.events.emit(PresaleEvent::Whitelisted { identity });
        }
        Ok(())
    }

    pub fn is_whitelisted(&self, identity: &Address) -> bool {
        self.state.read().registry.is_whitelisted(identity)
    }

    // ---------- Sale clock ----------

    pub fn is_open(&self) -> bool {
        self.window.is_open(self.clock.now())
    }

    pub fn has_closed(&self) -> bool {
        self.window.has_closed(self.clock.now())
    }

    // ---------- Contributions ----------

    /// Accept `amount` of native currency from `identity` and forward it to the receiver.
    #[instrument(level = "debug", skip_all, fields(identity = %identity, amount = %amount))]
    pub fn contribute(&self, identity: Address, amount: Balance) -> Result<Credit, PresaleError> {
        let _ex = self.exec.lock();
        let now = self.clock.now();

        let credit = {
            let mut st = self.state.write();
            st.ensure_idle()?;
            if !st.registry.is_whitelisted(&identity) {
                debug!("rejected: not whitelisted");
                return Err(PresaleError::NotWhitelisted);
            }
            if !self.window.is_open(now) || st.settlement.is_finalized() {
                debug!(now, "rejected: sale closed");
                return Err(PresaleError::SaleClosed);
            }
            let credit = st.ledger.credit(identity, amount)?;
            st.in_flight = Some("contribute");
            credit
        };

        let sent = self.bank.send(self.params.receiver, amount);

        {
            let mut st = self.state.write();
            st.in_flight = None;
            if let Err(e) = sent {
                st.ledger.reverse(identity, amount)?;
                warn!(error = %e, "forwarding to receiver failed; contribution reverted");
                return Err(e.into());
            }
        }

        info!(
            amount = %amount,
            new_total = %credit.participant_total,
            total_raised = %credit.total_raised,
            "contribution accepted"
        );
        self.events.emit(PresaleEvent::Contributed {
            identity,
            amount,
            new_total: credit.participant_total,
            total_raised: credit.total_raised,
        });
        Ok(credit)
    }

    /// Token entitlement of `identity`: `contributed * rate`.
    pub fn balance_of(&self, identity: &Address) -> Result<Balance, PresaleError> {
        self.state.read().ledger.entitlement(identity)
    }

    pub fn contributed(&self, identity: &Address) -> Balance {
        self.state.read().ledger.contributed(identity)
    }

    pub fn total_raised(&self) -> Balance {
        self.state.read().ledger.total_raised()
    }

    // ---------- Settlement ----------

    /// Close the collecting phase for good. Anyone may call it once the window has closed.
    pub fn finalize(&self) -> Result<(), PresaleError> {
        let _ex = self.exec.lock();
        let now = self.clock.now();
        let total_raised = {
            let mut st = self.state.write();
            st.ensure_idle()?;
            st.settlement.finalize(&self.window, now)?;
            st.ledger.total_raised()
        };
        info!(total_raised = %total_raised, at = now, "presale finalized");
        self.events.emit(PresaleEvent::Finalized { total_raised, at: now });
        Ok(())
    }

    /// Deliver the full entitlement of `identity` to `identity`. Any caller may trigger it.
    #[instrument(level = "debug", skip_all, fields(identity = %identity))]
    pub fn withdraw_tokens(&self, identity: Address) -> Result<Balance, PresaleError> {
        let _ex = self.exec.lock();

        let amount = {
            let mut st = self.state.write();
            st.ensure_idle()?;
            let entitlement = st.ledger.entitlement(&identity)?;
            let amount = st.settlement.begin_withdrawal(identity, entitlement)?;
            st.in_flight = Some("withdraw_tokens");
            amount
        };

        let sent = self.token.transfer(identity, amount);

        {
            let mut st = self.state.write();
            st.in_flight = None;
            if let Err(e) = sent {
                st.settlement.cancel_withdrawal(&identity);
                warn!(error = %e, "token transfer failed; withdrawal reverted");
                return Err(e.into());
            }
        }

        info!(amount = %amount, "tokens withdrawn");
        self.events.emit(PresaleEvent::TokensWithdrawn { identity, amount });
        Ok(amount)
    }

    pub fn is_finalized(&self) -> bool {
        self.state.read().settlement.is_finalized()
    }

    pub fn phase(&self) -> Phase {
        self.state.read().settlement.phase()
    }

    pub fn has_withdrawn(&self, identity: &Address) -> bool {
        self.state.read().settlement.has_withdrawn(identity)
    }

    // ---------- Introspection ----------

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn rate(&self) -> Balance {
        self.params.rate
    }

    pub fn params(&self) -> &SaleParams {
        &self.params
    }

    /// Sale tokens currently held by the presale custody account.
    pub fn token_balance(&self) -> Balance {
        self.token.balance_of(self.params.custody)
    }

    pub fn snapshot(&self) -> Snapshot {
        let now = self.clock.now();
        let st = self.state.read();
        Snapshot {
            phase: st.settlement.phase(),
            is_open: self.window.is_open(now) && !st.settlement.is_finalized(),
            total_raised: st.ledger.total_raised(),
            hard_cap_headroom: st.ledger.headroom(),
            participants: st.ledger.participants(),
            whitelisted: st.registry.len(),
            withdrawals: st.settlement.withdrawals(),
            finalized_at: st.settlement.finalized_at(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PresaleEvent> {
        self.events.subscribe()
    }

    /// Most recent audit-log entries, newest first.
    pub fn events(&self, limit: usize) -> Vec<PresaleEvent> {
        self.events.recent(limit)
    }
}
