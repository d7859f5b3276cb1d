//! `tayseer-auth` — actor identity and role checks.
//!
//! Authorization is enforced as **explicit guard clauses** at the ledger's
//! public operations, not delegated to the storage layer. The role model
//! mirrors the four dashboards: cashier, store owner, admin, superadmin.

pub mod actor;
pub mod authorize;
pub mod role;

pub use actor::Actor;
pub use authorize::{AuthzError, require_privileged, require_redeemer};
pub use role::Role;
