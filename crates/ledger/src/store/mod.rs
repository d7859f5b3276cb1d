//! Persistence contract for voucher rows.
//!
//! The store is the unit of mutual exclusion: every mutation is a single
//! conditional update scoped to one row, bound to the `(status, version)`
//! the caller read. A zero-row match is a normal outcome (`Ok(false)`), not
//! an error; the ledger turns it into a `Conflict` for the caller.

mod in_memory;

use std::sync::Arc;

use thiserror::Error;

use tayseer_core::{StoreId, VoucherId};
use tayseer_vouchers::{Voucher, VoucherCode, VoucherStatus};

pub use in_memory::InMemoryVoucherStore;

/// Store operation error.
///
/// Infrastructure outcomes only; domain preconditions are validated before
/// the store is ever touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Uniqueness constraint on `code` rejected an insert. The whole batch
    /// is rolled back; nothing was written.
    #[error("duplicate voucher code: {0}")]
    DuplicateCode(String),

    /// Backend unreachable or in a broken state. Surfaced verbatim; the
    /// outcome of any in-flight write is unknown and the caller must
    /// re-read before retrying.
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

/// Row state a conditional update binds to.
///
/// Binding the version (not just the status) closes the lost-update window:
/// two writers holding the same snapshot cannot both land even when their
/// writes would leave the status unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Expected {
    pub status: VoucherStatus,
    pub version: u64,
}

impl Expected {
    /// The predicate matching the snapshot a transition was computed from.
    pub fn of(voucher: &Voucher) -> Self {
        Self {
            status: voucher.status(),
            version: voucher.version(),
        }
    }
}

/// Voucher row store.
///
/// Implementations must:
/// - reject `insert_batch` entirely on any code-uniqueness violation
///   (all-or-nothing, no partial batches);
/// - apply `update` only when the stored row still matches `expected`,
///   reporting a miss as `Ok(false)`;
/// - keep `code` lookups consistent with inserts/deletes.
pub trait VoucherStore: Send + Sync {
    /// Bulk insert of freshly issued rows (all-or-nothing).
    fn insert_batch(&self, vouchers: Vec<Voucher>) -> Result<(), StoreError>;

    fn get(&self, id: VoucherId) -> Result<Option<Voucher>, StoreError>;

    /// Lookup by the public code (QR verification path).
    fn find_by_code(&self, code: &VoucherCode) -> Result<Option<Voucher>, StoreError>;

    /// Conditional replace: `UPDATE ... WHERE id = ? AND status = ? AND
    /// version = ?`. Returns `Ok(false)` when zero rows matched.
    fn update(&self, id: VoucherId, expected: Expected, next: Voucher)
    -> Result<bool, StoreError>;

    /// Conditional hard delete: `DELETE ... WHERE id = ? AND status = ? AND
    /// version = ?`. Returns `Ok(false)` when zero rows matched (row gone or
    /// changed since the read).
    fn delete(&self, id: VoucherId, expected: Expected) -> Result<bool, StoreError>;

    /// All vouchers belonging to one store (dashboard listings).
    fn list_for_store(&self, store_id: StoreId) -> Result<Vec<Voucher>, StoreError>;
}

impl<S> VoucherStore for Arc<S>
where
    S: VoucherStore + ?Sized,
{
    fn insert_batch(&self, vouchers: Vec<Voucher>) -> Result<(), StoreError> {
        (**self).insert_batch(vouchers)
    }

    fn get(&self, id: VoucherId) -> Result<Option<Voucher>, StoreError> {
        (**self).get(id)
    }

    fn find_by_code(&self, code: &VoucherCode) -> Result<Option<Voucher>, StoreError> {
        (**self).find_by_code(code)
    }

    fn update(
        &self,
        id: VoucherId,
        expected: Expected,
        next: Voucher,
    ) -> Result<bool, StoreError> {
        (**self).update(id, expected, next)
    }

    fn delete(&self, id: VoucherId, expected: Expected) -> Result<bool, StoreError> {
        (**self).delete(id, expected)
    }

    fn list_for_store(&self, store_id: StoreId) -> Result<Vec<Voucher>, StoreError> {
        (**self).list_for_store(store_id)
    }
}
