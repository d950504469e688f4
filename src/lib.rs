//! Fixed-rate presale core
//! Features:
//! - Owner-controlled whitelist (single and batch, all-or-nothing)
//! - Contributions in native currency inside a fixed `[opening, closing)` window
//! - Per-address cap and global hard cap, full-or-nothing acceptance
//! - Funds forwarded to the receiver on every contribution
//! - One-way finalize after close, then a single token withdrawal per participant
//! - Checks-effects-interactions with compensation on collaborator failure
//! - Serialized calls via parking_lot reentrant lock; mutation refused while a transfer is pending
//! - Events: tokio::broadcast plus bounded audit log
//!
//! Notes:
//! - The token, the native-currency ledger and the clock are collaborators
//!   (see [`backend`]); plug your runtime's primitives in there.
//!
//! (c) Aethernova

#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod params;
pub mod presale;
pub mod registry;
pub mod settlement;
pub mod telemetry;
pub mod types;

pub use backend::{Clock, SystemClock, TokenService, ValueTransfer};
pub use error::{PresaleError, TransferError};
pub use events::PresaleEvent;
pub use ledger::Credit;
pub use params::{SaleParams, SaleWindow, NATIVE_UNIT, REFERENCE_RATE};
pub use presale::{Presale, Snapshot};
pub use settlement::Phase;
pub use types::{Address, Balance, Timestamp};
