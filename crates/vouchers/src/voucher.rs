//! Voucher lifecycle state machine.
//!
//! ```text
//! [blank] ──activate──▶ [active] ──consume(balance→0)──▶ [redeemed]
//!                          │ ├──edit (stays active, balance reset)
//!                          │ └──expire──▶ [expired]
//! [blank|active] ──void──▶ [void]
//! ```
//!
//! Transitions are pure: they take `&self`, validate every precondition, and
//! return the next row state with `version + 1`. Nothing here touches
//! storage; the ledger persists the result with a conditional update bound
//! to the status and version this transition was computed from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tayseer_core::{Amount, DomainError, DomainResult, StoreId, UserId, VoucherId};

use crate::code::VoucherCode;
use crate::contact::{PhoneNumber, SecurityPin};

/// Lifecycle status. `redeemed`, `expired`, and `void` are terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    Blank,
    Active,
    Redeemed,
    Expired,
    Void,
}

impl VoucherStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Redeemed | Self::Expired | Self::Void)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Active => "active",
            Self::Redeemed => "redeemed",
            Self::Expired => "expired",
            Self::Void => "void",
        }
    }
}

impl core::fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activation input: buyer metadata and the amount to load.
///
/// Phone and PIN arrive as raw user input and are validated here, so the
/// caller gets `InvalidPhone`/`InvalidPin` before any write is attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRequest {
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub recipient_name: Option<String>,
    pub initial_amount: u64,
    pub security_pin: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Administrative correction of an active voucher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub new_amount: u64,
    pub security_pin: Option<String>,
}

/// A prepaid gift-voucher row.
///
/// Owned by exactly one store; `code` is globally unique across stores.
/// `version` is the optimistic-concurrency token: it moves by one on every
/// successful transition, and conditional updates bind to it so two writers
/// working from the same snapshot can never both land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    id: VoucherId,
    code: VoucherCode,
    store_id: StoreId,
    status: VoucherStatus,
    initial_amount: Amount,
    balance: Amount,
    buyer_name: Option<String>,
    buyer_phone: Option<PhoneNumber>,
    recipient_name: Option<String>,
    security_pin: Option<SecurityPin>,
    created_at: DateTime<Utc>,
    activated_at: Option<DateTime<Utc>>,
    redeemed_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    activated_by: Option<UserId>,
    version: u64,
}

impl Voucher {
    /// Pre-provision a blank voucher (batch issuance).
    pub fn issue(id: VoucherId, code: VoucherCode, store_id: StoreId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            code,
            store_id,
            status: VoucherStatus::Blank,
            initial_amount: Amount::ZERO,
            balance: Amount::ZERO,
            buyer_name: None,
            buyer_phone: None,
            recipient_name: None,
            security_pin: None,
            created_at: now,
            activated_at: None,
            redeemed_at: None,
            expires_at: None,
            activated_by: None,
            version: 0,
        }
    }

    pub fn id(&self) -> VoucherId {
        self.id
    }

    pub fn code(&self) -> &VoucherCode {
        &self.code
    }

    pub fn store_id(&self) -> StoreId {
        self.store_id
    }

    pub fn status(&self) -> VoucherStatus {
        self.status
    }

    pub fn initial_amount(&self) -> Amount {
        self.initial_amount
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn buyer_name(&self) -> Option<&str> {
        self.buyer_name.as_deref()
    }

    pub fn buyer_phone(&self) -> Option<&PhoneNumber> {
        self.buyer_phone.as_ref()
    }

    pub fn recipient_name(&self) -> Option<&str> {
        self.recipient_name.as_deref()
    }

    pub fn has_pin(&self) -> bool {
        self.security_pin.is_some()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn activated_at(&self) -> Option<DateTime<Utc>> {
        self.activated_at
    }

    pub fn redeemed_at(&self) -> Option<DateTime<Utc>> {
        self.redeemed_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn activated_by(&self) -> Option<UserId> {
        self.activated_by
    }

    /// Monotonic row version (one step per successful transition).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Transition `blank → active`: fix the amount and buyer metadata.
    pub fn activate(
        &self,
        request: &ActivationRequest,
        activated_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Voucher> {
        if self.status != VoucherStatus::Blank {
            return Err(DomainError::NotBlank(self.status.to_string()));
        }

        let amount = Amount::positive(request.initial_amount)?;
        let buyer_phone = parse_opt_phone(request.buyer_phone.as_deref())?;
        let security_pin = parse_opt_pin(request.security_pin.as_deref())?;

        let mut next = self.clone();
        next.status = VoucherStatus::Active;
        next.initial_amount = amount;
        next.balance = amount;
        next.buyer_name = request.buyer_name.clone();
        next.buyer_phone = buyer_phone;
        next.recipient_name = request.recipient_name.clone();
        next.security_pin = security_pin;
        next.activated_at = Some(now);
        next.expires_at = request.expires_at;
        next.activated_by = Some(activated_by);
        next.version += 1;
        Ok(next)
    }

    /// Decrement the balance; the redemption that reaches zero also moves
    /// the voucher to `redeemed` and stamps `redeemed_at`.
    pub fn consume(
        &self,
        amount: u64,
        supplied_pin: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<Voucher> {
        if self.status != VoucherStatus::Active {
            return Err(DomainError::NotActive(self.status.to_string()));
        }

        let amount = Amount::positive(amount)?;

        if let Some(pin) = &self.security_pin {
            match supplied_pin {
                Some(supplied) if pin.matches(supplied) => {}
                _ => return Err(DomainError::WrongPin),
            }
        }

        let new_balance = self.balance.debit(amount)?;

        let mut next = self.clone();
        next.balance = new_balance;
        if new_balance.is_zero() {
            next.status = VoucherStatus::Redeemed;
            next.redeemed_at = Some(now);
        }
        next.version += 1;
        Ok(next)
    }

    /// Administrative correction: overwrite buyer data and reload the
    /// balance to `new_amount`, discarding prior redemption progress.
    pub fn edit(&self, request: &EditRequest) -> DomainResult<Voucher> {
        if self.status != VoucherStatus::Active {
            return Err(DomainError::NotActive(self.status.to_string()));
        }

        let amount = Amount::positive(request.new_amount)?;
        let buyer_phone = parse_opt_phone(request.buyer_phone.as_deref())?;
        let security_pin = parse_opt_pin(request.security_pin.as_deref())?;

        let mut next = self.clone();
        next.initial_amount = amount;
        next.balance = amount;
        next.buyer_name = request.buyer_name.clone();
        next.buyer_phone = buyer_phone;
        next.security_pin = security_pin;
        next.version += 1;
        Ok(next)
    }

    /// Administrative cancellation. Allowed from any non-terminal status.
    pub fn void(&self) -> DomainResult<Voucher> {
        if self.status.is_terminal() {
            return Err(DomainError::validation(format!(
                "cannot void a {} voucher",
                self.status
            )));
        }

        let mut next = self.clone();
        next.status = VoucherStatus::Void;
        next.version += 1;
        Ok(next)
    }

    /// Out-of-band expiry. Only `active` vouchers expire; blanks hold no
    /// value and terminals stay put.
    pub fn expire(&self) -> DomainResult<Voucher> {
        if self.status != VoucherStatus::Active {
            return Err(DomainError::NotActive(self.status.to_string()));
        }

        let mut next = self.clone();
        next.status = VoucherStatus::Expired;
        next.version += 1;
        Ok(next)
    }

    /// Verify the row-level invariants. Transitions preserve these by
    /// construction; tests call this after every step.
    pub fn check_invariants(&self) -> DomainResult<()> {
        if self.balance > self.initial_amount {
            return Err(DomainError::validation(format!(
                "balance {} exceeds initial amount {}",
                self.balance, self.initial_amount
            )));
        }

        match self.status {
            VoucherStatus::Blank => {
                if !self.initial_amount.is_zero()
                    || !self.balance.is_zero()
                    || self.activated_at.is_some()
                {
                    return Err(DomainError::validation("blank voucher holds state"));
                }
            }
            VoucherStatus::Active => {
                if self.activated_at.is_none() || self.balance.is_zero() {
                    return Err(DomainError::validation(
                        "active voucher must be activated and hold balance",
                    ));
                }
            }
            VoucherStatus::Redeemed => {
                if !self.balance.is_zero() || self.activated_at.is_none() {
                    return Err(DomainError::validation(
                        "redeemed voucher must be activated with zero balance",
                    ));
                }
            }
            VoucherStatus::Expired | VoucherStatus::Void => {}
        }

        Ok(())
    }
}

fn parse_opt_phone(raw: Option<&str>) -> DomainResult<Option<PhoneNumber>> {
    raw.map(PhoneNumber::parse).transpose()
}

fn parse_opt_pin(raw: Option<&str>) -> DomainResult<Option<SecurityPin>> {
    raw.map(SecurityPin::parse).transpose()
}
