//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// lifecycle preconditions). Infrastructure concerns (lost conditional-update
/// races, storage availability) belong to the ledger layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A requested voucher does not exist.
    #[error("voucher not found")]
    NotFound,

    /// Operation requires a blank voucher; the row is already past `blank`.
    #[error("voucher is not blank (status: {0})")]
    NotBlank(String),

    /// Operation requires an active voucher.
    #[error("voucher is not active (status: {0})")]
    NotActive(String),

    /// Monetary amount failed validation (zero, or above balance caps).
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Buyer phone failed the format check.
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    /// Security PIN failed the format check.
    #[error("invalid security pin: {0}")]
    InvalidPin(String),

    /// Redemption requested more than the remaining balance.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    /// Supplied PIN does not match the voucher's security PIN.
    #[error("wrong pin")]
    WrongPin,

    /// A value failed validation (e.g. malformed input, non-positive count).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    pub fn invalid_phone(msg: impl Into<String>) -> Self {
        Self::InvalidPhone(msg.into())
    }

    pub fn invalid_pin(msg: impl Into<String>) -> Self {
        Self::InvalidPin(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
