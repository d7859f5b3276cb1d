//! Monetary amounts.
//!
//! Amounts are held in the smallest currency unit (e.g., cents) as unsigned
//! integers, so a balance can never be represented as negative. Arithmetic is
//! checked; subtracting past zero is a domain error, never a wrap.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Non-negative monetary amount in the smallest currency unit.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Validate an amount that must be strictly positive (activation,
    /// redemption, administrative corrections).
    pub fn positive(value: u64) -> DomainResult<Self> {
        if value == 0 {
            return Err(DomainError::invalid_amount("amount must be positive"));
        }
        Ok(Self(value))
    }

    /// Subtract a redemption from a balance.
    ///
    /// Fails with `InsufficientBalance` rather than saturating, so the caller
    /// can surface the exact shortfall.
    pub fn debit(self, amount: Amount) -> DomainResult<Self> {
        self.0
            .checked_sub(amount.0)
            .map(Amount)
            .ok_or(DomainError::InsufficientBalance {
                requested: amount.0,
                available: self.0,
            })
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Amount> for u64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}
