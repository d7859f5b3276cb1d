//! Acting user identity.

use serde::{Deserialize, Serialize};

use tayseer_core::UserId;

use crate::Role;

/// The authenticated user on whose behalf a ledger operation runs.
///
/// Passed explicitly into every call that needs it (no ambient session
/// state); `user_id` populates `activated_by`, `role` feeds the guards.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
