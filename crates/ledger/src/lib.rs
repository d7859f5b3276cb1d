//! `tayseer-ledger` — voucher lifecycle orchestration over a persistence
//! contract with conditional-update semantics.
//!
//! The ledger composes three injected collaborators:
//!
//! - a [`VoucherStore`](store::VoucherStore) providing row CRUD where every
//!   mutation is a compare-and-swap on the row's `(status, version)`;
//! - a [`Clock`](clock::Clock) for transition timestamps;
//! - a [`CodeGenerator`](tayseer_vouchers::CodeGenerator) for issuing codes,
//!   wrapped in a bounded collision-retry loop.
//!
//! A conditional update that matches zero rows is surfaced as
//! [`LedgerError::Conflict`], never retried here; the retry policy belongs
//! to the caller, who must re-read the voucher first.

pub mod clock;
pub mod error;
pub mod ledger;
pub mod store;


pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{DeletePolicy, VoucherLedger};
pub use store::{Expected, InMemoryVoucherStore, StoreError, VoucherStore};
