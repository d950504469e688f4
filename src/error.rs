use thiserror::Error;

/// Failure reported by an external collaborator (value transfer or token service).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient balance")]
    Insufficient,
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Every presale call either succeeds completely or fails with one of these,
/// leaving no partial effect behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresaleError {
    #[error("caller is not authorized")]
    Unauthorized,
    #[error("identity is not whitelisted")]
    NotWhitelisted,
    #[error("sale is not open")]
    SaleClosed,
    #[error("sale has not closed yet")]
    SaleNotClosed,
    #[error("per-address cap exceeded")]
    ExceedsPerAddressCap,
    #[error("hard cap exceeded")]
    ExceedsHardCap,
    #[error("sale already finalized")]
    AlreadyFinalized,
    #[error("sale not finalized")]
    NotFinalized,
    #[error("tokens already withdrawn")]
    AlreadyWithdrawn,
    #[error("nothing to withdraw")]
    NothingToWithdraw,
    #[error("amount must be > 0")]
    ZeroAmount,
    /// Carries the operation whose external transfer is still in flight.
    #[error("call refused while `{0}` awaits its external transfer")]
    ReentrantCall(&'static str),
    #[error("arithmetic overflow")]
    MathOverflow,
    #[error("invalid sale parameters: {0}")]
    InvalidParams(String),
    #[error("external transfer failed: {0}")]
    ExternalTransferFailed(#[from] TransferError),
}
