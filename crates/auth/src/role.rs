//! Role model for RBAC.

use serde::{Deserialize, Serialize};

/// Role of an authenticated user within a store.
///
/// Roles are a closed set here (unlike free-form permission strings): every
/// dashboard in the platform maps to exactly one of these, and the ledger's
/// guard clauses only need two tiers (redemption-capable vs privileged).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Cashier,
    Owner,
    Admin,
    Superadmin,
}

impl Role {
    /// May activate and redeem vouchers at the counter.
    ///
    /// Counter work belongs to store staff; the admin tiers oversee stores
    /// and correct mistakes but do not run tills.
    pub fn can_redeem(self) -> bool {
        matches!(self, Role::Cashier | Role::Owner)
    }

    /// May perform destructive administrative corrections (edit an active
    /// voucher, void, delete).
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin | Role::Superadmin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Cashier => "cashier",
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
