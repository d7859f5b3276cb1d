use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tayseer_core::{StoreId, VoucherId};
use tayseer_vouchers::{Voucher, VoucherCode};

use super::{Expected, StoreError, VoucherStore};

/// In-memory voucher store.
///
/// Intended for tests/dev. Enforces the same contract a hosted relational
/// backend would: code uniqueness on insert, compare-and-swap on update.
#[derive(Debug, Default)]
pub struct InMemoryVoucherStore {
    inner: RwLock<Rows>,
}

#[derive(Debug, Default)]
struct Rows {
    by_id: HashMap<VoucherId, Voucher>,
    codes: HashMap<String, VoucherId>,
}

impl InMemoryVoucherStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl VoucherStore for InMemoryVoucherStore {
    fn insert_batch(&self, vouchers: Vec<Voucher>) -> Result<(), StoreError> {
        if vouchers.is_empty() {
            return Ok(());
        }

        let mut rows = self.inner.write().map_err(|_| poisoned())?;

        // Validate the whole batch before writing anything (all-or-nothing).
        let mut batch_codes: HashSet<&str> = HashSet::new();
        for voucher in &vouchers {
            let code = voucher.code().as_str();
            if rows.codes.contains_key(code) || !batch_codes.insert(code) {
                return Err(StoreError::DuplicateCode(code.to_string()));
            }
        }

        for voucher in vouchers {
            rows.codes
                .insert(voucher.code().as_str().to_string(), voucher.id());
            rows.by_id.insert(voucher.id(), voucher);
        }

        Ok(())
    }

    fn get(&self, id: VoucherId) -> Result<Option<Voucher>, StoreError> {
        let rows = self.inner.read().map_err(|_| poisoned())?;
        Ok(rows.by_id.get(&id).cloned())
    }

    fn find_by_code(&self, code: &VoucherCode) -> Result<Option<Voucher>, StoreError> {
        let rows = self.inner.read().map_err(|_| poisoned())?;
        Ok(rows
            .codes
            .get(code.as_str())
            .and_then(|id| rows.by_id.get(id))
            .cloned())
    }

    fn update(
        &self,
        id: VoucherId,
        expected: Expected,
        next: Voucher,
    ) -> Result<bool, StoreError> {
        let mut rows = self.inner.write().map_err(|_| poisoned())?;

        let matches = rows
            .by_id
            .get(&id)
            .is_some_and(|row| row.status() == expected.status && row.version() == expected.version);
        if !matches {
            return Ok(false);
        }

        rows.by_id.insert(id, next);
        Ok(true)
    }

    fn delete(&self, id: VoucherId, expected: Expected) -> Result<bool, StoreError> {
        let mut rows = self.inner.write().map_err(|_| poisoned())?;

        let matches = rows
            .by_id
            .get(&id)
            .is_some_and(|row| row.status() == expected.status && row.version() == expected.version);
        if !matches {
            return Ok(false);
        }

        if let Some(row) = rows.by_id.remove(&id) {
            rows.codes.remove(row.code().as_str());
        }
        Ok(true)
    }

    fn list_for_store(&self, store_id: StoreId) -> Result<Vec<Voucher>, StoreError> {
        let rows = self.inner.read().map_err(|_| poisoned())?;
        Ok(rows
            .by_id
            .values()
            .filter(|v| v.store_id() == store_id)
            .cloned()
            .collect())
    }
}
