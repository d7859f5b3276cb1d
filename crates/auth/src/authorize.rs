//! Guard clauses for privileged ledger operations.
//!
//! - No IO
//! - No panics
//! - No business logic (pure policy check)

use thiserror::Error;

use crate::Actor;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{0}' may not perform this operation")]
    Forbidden(String),
}

/// Require a role allowed to activate/redeem at the counter.
pub fn require_redeemer(actor: &Actor) -> Result<(), AuthzError> {
    if actor.role.can_redeem() {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(actor.role.to_string()))
    }
}

/// Require an administrative role (admin/superadmin).
///
/// Gates the destructive corrections: `EditActive`, `Void`, `Delete`.
pub fn require_privileged(actor: &Actor) -> Result<(), AuthzError> {
    if actor.role.is_privileged() {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(actor.role.to_string()))
    }
}
