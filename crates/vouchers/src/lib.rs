//! `tayseer-vouchers` — the voucher aggregate.
//!
//! This crate holds the lifecycle state machine and balance arithmetic as
//! **pure transition functions**: each operation validates its preconditions
//! against the current row state and returns the next row state, without any
//! IO. Persisting a transition (and detecting lost races) is the ledger
//! crate's job.

pub mod code;
pub mod contact;
pub mod voucher;

pub use code::{CodeGenerator, UuidCodeGenerator, VoucherCode};
pub use contact::{PhoneNumber, SecurityPin};
pub use voucher::{ActivationRequest, EditRequest, Voucher, VoucherStatus};
