//! Buyer contact and redemption-authorization value objects.

use serde::{Deserialize, Serialize};

use tayseer_core::{DomainError, DomainResult};

/// Buyer phone number.
///
/// Accepts digits plus the usual formatting characters (spaces, `+`, `(`,
/// `)`, `-`), total length 6–20. Stored as entered (trimmed), not
/// normalized; the value is descriptive metadata, not a dialing target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();

        if trimmed.len() < 6 || trimmed.len() > 20 {
            return Err(DomainError::invalid_phone(
                "phone number must be 6-20 characters",
            ));
        }

        let valid = trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '(' | ')' | '-'));
        if !valid {
            return Err(DomainError::invalid_phone(
                "phone number may only contain digits, spaces, and + ( ) -",
            ));
        }

        if !trimmed.chars().any(|c| c.is_ascii_digit()) {
            return Err(DomainError::invalid_phone(
                "phone number must contain at least one digit",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short numeric code gating redemption.
///
/// 4–8 ASCII digits. Comparison is exact; there is no hashing here because
/// the PIN is a point-of-sale convenience, not a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityPin(String);

impl SecurityPin {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();

        if trimmed.len() < 4 || trimmed.len() > 8 {
            return Err(DomainError::invalid_pin("pin must be 4-8 digits"));
        }
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::invalid_pin("pin must contain only digits"));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Exact match against a supplied code.
    pub fn matches(&self, supplied: &str) -> bool {
        self.0 == supplied
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_phone_formats() {
        for raw in ["+1 (555) 123-4567", "0791234567", "555 1234", "  555 1234  "] {
            assert!(PhoneNumber::parse(raw).is_ok(), "rejected {raw:?}");
        }
    }

    #[test]
    fn rejects_malformed_phones() {
        assert!(matches!(
            PhoneNumber::parse("12345"),
            Err(DomainError::InvalidPhone(_))
        ));
        assert!(matches!(
            PhoneNumber::parse("555-ABCD-123"),
            Err(DomainError::InvalidPhone(_))
        ));
        assert!(matches!(
            PhoneNumber::parse("+(---) -"),
            Err(DomainError::InvalidPhone(_))
        ));
        assert!(matches!(
            PhoneNumber::parse("123456789012345678901"),
            Err(DomainError::InvalidPhone(_))
        ));
    }

    #[test]
    fn phone_is_stored_trimmed() {
        let phone = PhoneNumber::parse("  555 1234 ").unwrap();
        assert_eq!(phone.as_str(), "555 1234");
    }

    #[test]
    fn pin_requires_four_to_eight_digits() {
        assert!(SecurityPin::parse("1234").is_ok());
        assert!(SecurityPin::parse("12345678").is_ok());
        assert!(matches!(
            SecurityPin::parse("123"),
            Err(DomainError::InvalidPin(_))
        ));
        assert!(matches!(
            SecurityPin::parse("123456789"),
            Err(DomainError::InvalidPin(_))
        ));
        assert!(matches!(
            SecurityPin::parse("12a4"),
            Err(DomainError::InvalidPin(_))
        ));
    }

    #[test]
    fn pin_match_is_exact() {
        let pin = SecurityPin::parse("1234").unwrap();
        assert!(pin.matches("1234"));
        assert!(!pin.matches("9999"));
        assert!(!pin.matches("123"));
    }
}
