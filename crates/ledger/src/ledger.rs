//! The voucher ledger service.
//!
//! Every operation follows the same pipeline:
//!
//! ```text
//! validate input → read row → pure transition (tayseer-vouchers)
//!                → conditional update bound to the read (status, version)
//! ```
//!
//! A zero-row update means another session changed the voucher between our
//! read and our write; it surfaces as `Conflict` and is never retried here.

use tracing::{info, warn};

use tayseer_auth::{Actor, require_privileged, require_redeemer};
use tayseer_core::{DomainError, StoreId, VoucherId};
use tayseer_vouchers::{
    ActivationRequest, CodeGenerator, EditRequest, UuidCodeGenerator, Voucher, VoucherCode,
    VoucherStatus,
};

use crate::clock::{Clock, SystemClock};
use crate::error::{LedgerError, LedgerResult};
use crate::store::{Expected, StoreError, VoucherStore};

/// What `delete` is allowed to destroy.
///
/// The legacy flows hard-delete unconditionally; whether that should apply
/// to an active voucher still holding balance is a policy question, so it is
/// configurable rather than assumed.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Refuse to delete a voucher that still holds redeemable value
    /// (i.e. `active`). Blank and terminal rows may go.
    #[default]
    RefuseValuable,
    /// Unconditional hard delete (legacy behavior).
    Any,
}

/// Batch issuance retries wholesale on a code collision; beyond this the
/// store error surfaces to the caller.
const MAX_ISSUE_ATTEMPTS: u32 = 3;

/// Voucher lifecycle orchestrator.
pub struct VoucherLedger<S, C = SystemClock, G = UuidCodeGenerator> {
    store: S,
    clock: C,
    codes: G,
    delete_policy: DeletePolicy,
}

impl<S> VoucherLedger<S>
where
    S: VoucherStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
            codes: UuidCodeGenerator::default(),
            delete_policy: DeletePolicy::default(),
        }
    }
}

impl<S, C, G> VoucherLedger<S, C, G>
where
    S: VoucherStore,
    C: Clock,
    G: CodeGenerator,
{
    pub fn with_clock<C2: Clock>(self, clock: C2) -> VoucherLedger<S, C2, G> {
        VoucherLedger {
            store: self.store,
            clock,
            codes: self.codes,
            delete_policy: self.delete_policy,
        }
    }

    pub fn with_code_generator<G2: CodeGenerator>(self, codes: G2) -> VoucherLedger<S, C, G2> {
        VoucherLedger {
            store: self.store,
            clock: self.clock,
            codes,
            delete_policy: self.delete_policy,
        }
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Pre-provision `count` blank vouchers for a store.
    ///
    /// Codes come from the injected generator; if the store's uniqueness
    /// constraint rejects the batch, the whole batch is regenerated and
    /// retried a bounded number of times.
    pub fn issue_blank(&self, store_id: StoreId, count: u32) -> LedgerResult<Vec<Voucher>> {
        if count < 1 {
            return Err(DomainError::validation("count must be at least 1").into());
        }

        let mut attempt = 1;
        loop {
            let now = self.clock.now();
            let batch: Vec<Voucher> = (0..count)
                .map(|_| Voucher::issue(VoucherId::new(), self.codes.generate(), store_id, now))
                .collect();

            match self.store.insert_batch(batch.clone()) {
                Ok(()) => {
                    info!(%store_id, count, "issued blank vouchers");
                    return Ok(batch);
                }
                Err(StoreError::DuplicateCode(code)) if attempt < MAX_ISSUE_ATTEMPTS => {
                    warn!(%store_id, %code, attempt, "voucher code collision, regenerating batch");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// `blank → active`: load the amount and buyer metadata onto a voucher.
    pub fn activate(
        &self,
        voucher_id: VoucherId,
        request: &ActivationRequest,
        actor: &Actor,
    ) -> LedgerResult<Voucher> {
        require_redeemer(actor)?;

        let current = self.load(voucher_id)?;
        let next = current.activate(request, actor.user_id, self.clock.now())?;
        self.commit("activate", &current, next)
    }

    /// Decrement an active voucher's balance; reaching zero redeems it.
    pub fn consume(
        &self,
        voucher_id: VoucherId,
        amount: u64,
        supplied_pin: Option<&str>,
    ) -> LedgerResult<Voucher> {
        let current = self.load(voucher_id)?;
        let next = current.consume(amount, supplied_pin, self.clock.now())?;
        self.commit("consume", &current, next)
    }

    /// Administrative correction of an active voucher (admin/superadmin
    /// only). Resets the balance to the corrected amount.
    pub fn edit_active(
        &self,
        voucher_id: VoucherId,
        request: &EditRequest,
        actor: &Actor,
    ) -> LedgerResult<Voucher> {
        require_privileged(actor)?;

        let current = self.load(voucher_id)?;
        let next = current.edit(request)?;
        self.commit("edit_active", &current, next)
    }

    /// Administrative cancellation (admin/superadmin only).
    pub fn void(&self, voucher_id: VoucherId, actor: &Actor) -> LedgerResult<Voucher> {
        require_privileged(actor)?;

        let current = self.load(voucher_id)?;
        let next = current.void()?;
        self.commit("void", &current, next)
    }

    /// Out-of-band expiry (`active → expired`).
    ///
    /// The trigger lives outside this core: whatever scheduler or query-time
    /// sweep the deployment runs calls this per voucher.
    pub fn expire(&self, voucher_id: VoucherId) -> LedgerResult<Voucher> {
        let current = self.load(voucher_id)?;
        let next = current.expire()?;
        self.commit("expire", &current, next)
    }

    /// Hard delete (admin/superadmin only), gated by the configured
    /// [`DeletePolicy`]. Irreversible.
    ///
    /// The delete is conditional on the `(status, version)` the policy check
    /// read, so a voucher activated between the check and the write survives
    /// and the caller gets a `Conflict` instead.
    pub fn delete(&self, voucher_id: VoucherId, actor: &Actor) -> LedgerResult<()> {
        require_privileged(actor)?;

        let current = self.load(voucher_id)?;
        if self.delete_policy == DeletePolicy::RefuseValuable
            && current.status() == VoucherStatus::Active
        {
            return Err(DomainError::validation(
                "cannot delete an active voucher holding balance",
            )
            .into());
        }

        if self.store.delete(voucher_id, Expected::of(&current))? {
            info!(%voucher_id, "deleted voucher");
            Ok(())
        } else {
            warn!(%voucher_id, "delete lost a conditional-update race");
            Err(LedgerError::conflict(format!(
                "voucher {voucher_id} changed concurrently during delete"
            )))
        }
    }

    pub fn get(&self, voucher_id: VoucherId) -> LedgerResult<Voucher> {
        self.load(voucher_id)
    }

    /// Public lookup by code (QR verification). Read-only; an unknown code
    /// is a normal outcome, not an error.
    pub fn find_by_code(&self, code: &VoucherCode) -> LedgerResult<Option<Voucher>> {
        Ok(self.store.find_by_code(code)?)
    }

    /// Tenant-scoped listing for dashboard counters.
    pub fn list_for_store(&self, store_id: StoreId) -> LedgerResult<Vec<Voucher>> {
        Ok(self.store.list_for_store(store_id)?)
    }

    fn load(&self, voucher_id: VoucherId) -> LedgerResult<Voucher> {
        self.store
            .get(voucher_id)?
            .ok_or_else(|| DomainError::not_found().into())
    }

    /// Persist a transition with a conditional update bound to the snapshot
    /// it was computed from.
    fn commit(&self, op: &str, read: &Voucher, next: Voucher) -> LedgerResult<Voucher> {
        let id = read.id();
        if self.store.update(id, Expected::of(read), next.clone())? {
            info!(
                voucher_id = %id,
                from = %read.status(),
                to = %next.status(),
                balance = %next.balance(),
                "{op} committed"
            );
            Ok(next)
        } else {
            warn!(voucher_id = %id, "{op} lost a conditional-update race");
            Err(LedgerError::conflict(format!(
                "voucher {id} changed concurrently during {op}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use tayseer_auth::{AuthzError, Role};
    use tayseer_core::UserId;
    use tayseer_vouchers::VoucherStatus;

    use super::*;
    use crate::store::InMemoryVoucherStore;

    fn ledger() -> VoucherLedger<InMemoryVoucherStore> {
        VoucherLedger::new(InMemoryVoucherStore::new())
    }

    fn cashier() -> Actor {
        Actor::new(UserId::new(), Role::Cashier)
    }

    fn admin() -> Actor {
        Actor::new(UserId::new(), Role::Admin)
    }

    fn activation(amount: u64) -> ActivationRequest {
        ActivationRequest {
            initial_amount: amount,
            ..Default::default()
        }
    }

    #[test]
    fn issue_blank_rejects_zero_count_before_any_write() {
        let ledger = ledger();
        let err = ledger.issue_blank(StoreId::new(), 0).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(DomainError::Validation(_))
        ));
    }

    #[test]
    fn issue_blank_provisions_unique_codes() {
        let ledger = ledger();
        let store_id = StoreId::new();
        let batch = ledger.issue_blank(store_id, 3).unwrap();

        assert_eq!(batch.len(), 3);
        for voucher in &batch {
            assert_eq!(voucher.status(), VoucherStatus::Blank);
            assert_eq!(
                ledger.find_by_code(voucher.code()).unwrap().unwrap().id(),
                voucher.id()
            );
        }
        assert_eq!(ledger.list_for_store(store_id).unwrap().len(), 3);
    }

    /// Generator that keeps emitting the same code, then recovers. Exercises
    /// the wholesale-batch retry loop.
    struct CollidingGenerator {
        failures: std::sync::atomic::AtomicU32,
        inner: UuidCodeGenerator,
    }

    impl CollidingGenerator {
        fn new(failures: u32) -> Self {
            Self {
                failures: std::sync::atomic::AtomicU32::new(failures),
                inner: UuidCodeGenerator::default(),
            }
        }
    }

    impl CodeGenerator for CollidingGenerator {
        fn generate(&self) -> VoucherCode {
            use std::sync::atomic::Ordering;
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                VoucherCode::new("GV-STUCK001")
            } else {
                self.inner.generate()
            }
        }
    }

    #[test]
    fn issue_blank_retries_batch_on_code_collision() {
        let ledger = ledger().with_code_generator(CollidingGenerator::new(2));
        let batch = ledger.issue_blank(StoreId::new(), 2).unwrap();
        assert_eq!(batch.len(), 2);
        assert_ne!(batch[0].code(), batch[1].code());
    }

    #[test]
    fn issue_blank_gives_up_after_bounded_retries() {
        // Enough queued failures to poison every attempt.
        let ledger = ledger().with_code_generator(CollidingGenerator::new(100));
        let err = ledger.issue_blank(StoreId::new(), 2).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Store(StoreError::DuplicateCode(_))
        ));
    }

    #[test]
    fn activate_unknown_voucher_is_not_found() {
        let err = ledger()
            .activate(VoucherId::new(), &activation(100), &cashier())
            .unwrap_err();
        assert_eq!(err, LedgerError::Domain(DomainError::NotFound));
    }

    #[test]
    fn activate_then_full_consume_round_trip() {
        let ledger = ledger();
        let batch = ledger.issue_blank(StoreId::new(), 1).unwrap();
        let id = batch[0].id();

        let active = ledger.activate(id, &activation(500), &cashier()).unwrap();
        assert_eq!(active.status(), VoucherStatus::Active);

        let redeemed = ledger.consume(id, 500, None).unwrap();
        assert_eq!(redeemed.status(), VoucherStatus::Redeemed);
        assert!(redeemed.balance().is_zero());
    }

    #[test]
    fn second_activation_is_rejected_not_reapplied() {
        let ledger = ledger();
        let id = ledger.issue_blank(StoreId::new(), 1).unwrap()[0].id();

        ledger.activate(id, &activation(500), &cashier()).unwrap();
        let err = ledger
            .activate(id, &activation(900), &cashier())
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::Domain(DomainError::NotBlank("active".to_string()))
        );
        // First activation stands untouched.
        assert_eq!(ledger.get(id).unwrap().balance().value(), 500);
    }

    #[test]
    fn edit_active_requires_privileged_role() {
        let ledger = ledger();
        let id = ledger.issue_blank(StoreId::new(), 1).unwrap()[0].id();
        ledger.activate(id, &activation(500), &cashier()).unwrap();

        let request = EditRequest {
            new_amount: 700,
            ..Default::default()
        };

        let err = ledger.edit_active(id, &request, &cashier()).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Forbidden(AuthzError::Forbidden(_))
        ));

        let edited = ledger.edit_active(id, &request, &admin()).unwrap();
        assert_eq!(edited.balance().value(), 700);
        assert_eq!(edited.initial_amount().value(), 700);
    }

    #[test]
    fn void_requires_privileged_role_and_non_terminal_status() {
        let ledger = ledger();
        let id = ledger.issue_blank(StoreId::new(), 1).unwrap()[0].id();

        assert!(ledger.void(id, &cashier()).is_err());

        let voided = ledger.void(id, &admin()).unwrap();
        assert_eq!(voided.status(), VoucherStatus::Void);

        let err = ledger.void(id, &admin()).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(DomainError::Validation(_))
        ));
    }

    #[test]
    fn expire_moves_active_to_expired() {
        let ledger = ledger();
        let id = ledger.issue_blank(StoreId::new(), 1).unwrap()[0].id();
        ledger.activate(id, &activation(500), &cashier()).unwrap();

        let expired = ledger.expire(id).unwrap();
        assert_eq!(expired.status(), VoucherStatus::Expired);

        let err = ledger.consume(id, 100, None).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Domain(DomainError::NotActive("expired".to_string()))
        );
    }

    #[test]
    fn delete_policy_refuses_active_vouchers_by_default() {
        let ledger = ledger();
        let id = ledger.issue_blank(StoreId::new(), 1).unwrap()[0].id();
        ledger.activate(id, &activation(500), &cashier()).unwrap();

        let err = ledger.delete(id, &admin()).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(DomainError::Validation(_))
        ));
        assert!(ledger.get(id).is_ok());
    }

    #[test]
    fn delete_policy_any_matches_legacy_behavior() {
        let ledger = ledger().with_delete_policy(DeletePolicy::Any);
        let id = ledger.issue_blank(StoreId::new(), 1).unwrap()[0].id();
        ledger.activate(id, &activation(500), &cashier()).unwrap();

        ledger.delete(id, &admin()).unwrap();
        assert_eq!(
            ledger.get(id).unwrap_err(),
            LedgerError::Domain(DomainError::NotFound)
        );
    }

    #[test]
    fn delete_requires_privileged_role() {
        let ledger = ledger();
        let id = ledger.issue_blank(StoreId::new(), 1).unwrap()[0].id();
        assert!(ledger.delete(id, &cashier()).is_err());
    }

    /// Store wrapper simulating another session activating the voucher after
    /// the deleter's policy check but before its write lands.
    struct ActivateBeforeDelete {
        inner: InMemoryVoucherStore,
    }

    impl VoucherStore for ActivateBeforeDelete {
        fn insert_batch(&self, vouchers: Vec<Voucher>) -> Result<(), StoreError> {
            self.inner.insert_batch(vouchers)
        }

        fn get(&self, id: VoucherId) -> Result<Option<Voucher>, StoreError> {
            self.inner.get(id)
        }

        fn find_by_code(&self, code: &VoucherCode) -> Result<Option<Voucher>, StoreError> {
            self.inner.find_by_code(code)
        }

        fn update(
            &self,
            id: VoucherId,
            expected: Expected,
            next: Voucher,
        ) -> Result<bool, StoreError> {
            self.inner.update(id, expected, next)
        }

        fn delete(&self, id: VoucherId, expected: Expected) -> Result<bool, StoreError> {
            if let Some(row) = self.inner.get(id)? {
                if row.status() == VoucherStatus::Blank {
                    let activated = row
                        .activate(
                            &ActivationRequest {
                                initial_amount: 500,
                                ..Default::default()
                            },
                            UserId::new(),
                            chrono::Utc::now(),
                        )
                        .unwrap();
                    self.inner.update(id, Expected::of(&row), activated)?;
                }
            }
            self.inner.delete(id, expected)
        }

        fn list_for_store(&self, store_id: StoreId) -> Result<Vec<Voucher>, StoreError> {
            self.inner.list_for_store(store_id)
        }
    }

    #[test]
    fn delete_cannot_destroy_a_voucher_activated_mid_flight() {
        let ledger = VoucherLedger::new(ActivateBeforeDelete {
            inner: InMemoryVoucherStore::new(),
        });
        let id = ledger.issue_blank(StoreId::new(), 1).unwrap()[0].id();

        // The policy check sees a deletable blank, but the racing activation
        // moves the row before the delete lands: zero rows match.
        let err = ledger.delete(id, &admin()).unwrap_err();
        assert!(err.is_conflict(), "unexpected outcome: {err:?}");

        let survivor = ledger.get(id).unwrap();
        assert_eq!(survivor.status(), VoucherStatus::Active);
        assert_eq!(survivor.balance().value(), 500);
    }

    #[test]
    fn activate_is_counter_staff_only() {
        let ledger = ledger();
        let id = ledger.issue_blank(StoreId::new(), 1).unwrap()[0].id();

        let err = ledger
            .activate(id, &activation(100), &admin())
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Forbidden(AuthzError::Forbidden(_))
        ));
        assert_eq!(ledger.get(id).unwrap().status(), VoucherStatus::Blank);
    }

    #[test]
    fn find_by_code_misses_are_not_errors() {
        let ledger = ledger();
        assert!(ledger
            .find_by_code(&VoucherCode::new("GV-MISSING0"))
            .unwrap()
            .is_none());
    }
}
