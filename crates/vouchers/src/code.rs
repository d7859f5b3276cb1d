//! Voucher codes and the code-generation strategy.
//!
//! Codes are the human-presentable token printed under the QR image and used
//! for public lookup. Generation is injectable so the ledger can run a
//! collision-retry loop against the store's uniqueness constraint instead of
//! trusting a fire-and-forget random string.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally-unique, human-presentable voucher token (`PREFIX-XXXXXXXX`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoucherCode(String);

impl VoucherCode {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for VoucherCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pluggable code-generation strategy.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> VoucherCode;
}

impl<G> CodeGenerator for Arc<G>
where
    G: CodeGenerator + ?Sized,
{
    fn generate(&self) -> VoucherCode {
        (**self).generate()
    }
}

/// Default generator: uppercase 8-hex-char fragment of a fresh UUID.
///
/// Uses the random tail of the UUID (the v7 head is a timestamp, which would
/// collide across a batch issued in the same millisecond).
#[derive(Debug, Clone)]
pub struct UuidCodeGenerator {
    prefix: String,
}

impl UuidCodeGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for UuidCodeGenerator {
    fn default() -> Self {
        Self::new("GV")
    }
}

impl CodeGenerator for UuidCodeGenerator {
    fn generate(&self) -> VoucherCode {
        let hex = Uuid::now_v7().simple().to_string();
        // Last 8 hex chars sit in the random section of a v7 UUID.
        let fragment = &hex[hex.len() - 8..];
        VoucherCode::new(format!("{}-{}", self.prefix, fragment.to_uppercase()))
    }
}
