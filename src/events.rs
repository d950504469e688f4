//! Presale notifications: broadcast to live subscribers and kept in a bounded audit log.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{Address, Balance, Timestamp};

/// Audit log capacity; oldest entries are evicted first.
pub const MAX_EVENTS: usize = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresaleEvent {
    Whitelisted { identity: Address },
    Contributed { identity: Address, amount: Balance, new_total: Balance, total_raised: Balance },
    Finalized { total_raised: Balance, at: Timestamp },
    TokensWithdrawn { identity: Address, amount: Balance },
}

pub struct EventBus {
    tx: broadcast::Sender<PresaleEvent>,
    log: Mutex<VecDeque<PresaleEvent>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, log: Mutex::new(VecDeque::with_capacity(1024)) }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PresaleEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, ev: PresaleEvent) {
        {
            let mut log = self.log.lock();
            if log.len() == MAX_EVENTS {
                log.pop_front();
            }
            log.push_back(ev.clone());
        }
        // No subscribers is not an error.
        let _ = self.tx.send(ev);
    }

    /// Most recent `limit` events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<PresaleEvent> {
        self.log.lock().iter().rev().take(limit).cloned().collect()
    }
}
