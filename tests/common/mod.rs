#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use fixed_presale::{
    Address, Balance, Clock, Presale, SaleParams, Timestamp, TokenService, TransferError, ValueTransfer,
    NATIVE_UNIT,
};
use parking_lot::Mutex;

pub const START: Timestamp = 1_700_000_000;
pub const TOKEN_SUPPLY: Balance = 200_000_000 * NATIVE_UNIT;

pub type Hook = Arc<dyn Fn(Address, Balance) + Send + Sync>;
pub type TestPresale = Presale<Token, Bank, ManualClock>;

pub fn addr(x: u8) -> Address {
    let mut a = [0u8; 20];
    a[19] = x;
    Address(a)
}

/// `n` as a fraction of one native unit: `units(1, 8) == 0.125`.
pub fn units(num: Balance, den: Balance) -> Balance {
    num * NATIVE_UNIT / den
}

pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn new(t: Timestamp) -> Self {
        Self(AtomicU64::new(t))
    }
    pub fn set(&self, t: Timestamp) {
        self.0.store(t, Ordering::SeqCst);
    }
    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.0.load(Ordering::SeqCst)
    }
}

/// Native-currency ledger; `send` credits the recipient.
#[derive(Default)]
pub struct Bank {
    balances: Mutex<HashMap<Address, Balance>>,
    pub fail: AtomicBool,
    hook: Mutex<Option<Hook>>,
    pub sends: AtomicU64,
}

impl Bank {
    pub fn balance(&self, who: Address) -> Balance {
        self.balances.lock().get(&who).copied().unwrap_or(0)
    }
    pub fn on_send(&self, hook: Hook) {
        *self.hook.lock() = Some(hook);
    }
}

impl ValueTransfer for Bank {
    fn send(&self, to: Address, amount: Balance) -> Result<(), TransferError> {
        let hook = self.hook.lock().clone();
        if let Some(h) = hook {
            h(to, amount);
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransferError::Rejected("receiver refused".into()));
        }
        *self.balances.lock().entry(to).or_default() += amount;
        self.sends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fungible token whose `transfer` debits the presale custody account.
pub struct Token {
    custody: Address,
    balances: Mutex<HashMap<Address, Balance>>,
    pub fail: AtomicBool,
    hook: Mutex<Option<Hook>>,
}

impl Token {
    pub fn new(custody: Address) -> Self {
        Self { custody, balances: Mutex::default(), fail: AtomicBool::new(false), hook: Mutex::new(None) }
    }
    pub fn mint(&self, to: Address, amount: Balance) {
        *self.balances.lock().entry(to).or_default() += amount;
    }
    pub fn on_transfer(&self, hook: Hook) {
        *self.hook.lock() = Some(hook);
    }
}

impl TokenService for Token {
    fn transfer(&self, to: Address, amount: Balance) -> Result<(), TransferError> {
        let hook = self.hook.lock().clone();
        if let Some(h) = hook {
            h(to, amount);
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransferError::Rejected("token paused".into()));
        }
        let mut m = self.balances.lock();
        let from = m.entry(self.custody).or_default();
        if *from < amount {
            return Err(TransferError::Insufficient);
        }
        *from -= amount;
        *m.entry(to).or_default() += amount;
        Ok(())
    }

    fn balance_of(&self, who: Address) -> Balance {
        self.balances.lock().get(&who).copied().unwrap_or(0)
    }
}

pub struct Env {
    pub presale: Arc<TestPresale>,
    pub token: Arc<Token>,
    pub bank: Arc<Bank>,
    pub clock: Arc<ManualClock>,
    pub owner: Address,
    pub receiver: Address,
    pub custody: Address,
}

/// Reference deployment: deployer is the owner, presale funded with 200M tokens.
pub fn deploy() -> Env {
    deploy_with_supply(TOKEN_SUPPLY)
}

pub fn deploy_with_supply(supply: Balance) -> Env {
    let owner = addr(0xA0);
    let receiver = addr(0xA1);
    let custody = addr(0xCC);
    let token = Arc::new(Token::new(custody));
    token.mint(custody, supply);
    let bank = Arc::new(Bank::default());
    let clock = Arc::new(ManualClock::new(START));
    let params = SaleParams::reference(receiver, custody, START);
    let presale = Presale::new(owner, params, token.clone(), bank.clone(), clock.clone()).unwrap();
    Env { presale, token, bank, clock, owner, receiver, custody }
}

impl Env {
    pub fn close_sale(&self) {
        self.clock.advance(100);
    }
}
