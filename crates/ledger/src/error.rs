//! Ledger error model: domain failures plus the infrastructure outcomes the
//! persistence contract can produce.

use thiserror::Error;

use tayseer_auth::AuthzError;
use tayseer_core::DomainError;

use crate::store::StoreError;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Deterministic domain/precondition failure (no write was attempted).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Role guard rejected the operation.
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// A conditional update matched zero rows: another writer changed the
    /// voucher between our read and our write. Re-read before retrying.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The persistence layer failed or rejected the write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// True when the caller should re-read the voucher and re-present its
    /// current state (lost race or stale precondition).
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
