//! Business rule validation for ledger operations.
//!
//! These checks are pure. The engine runs them once on an unlocked snapshot
//! to fail fast, and again on locked rows before mutating.

use rust_decimal::Decimal;
use swiftpay_shared::types::money::{AMOUNT_SCALE, has_valid_scale};

use super::error::LedgerError;
use super::types::{Account, AccountStatus, Role};

/// Validates a principal amount: positive, at most two decimal places.
///
/// # Errors
///
/// Returns `InvalidAmount` describing the violated rule.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    if !has_valid_scale(amount) {
        return Err(LedgerError::InvalidAmount(format!(
            "amount may have at most {AMOUNT_SCALE} decimal places"
        )));
    }
    Ok(())
}

/// Validates an amount against a floor.
///
/// # Errors
///
/// Returns `InvalidAmount` if the amount is invalid or below `minimum`.
pub fn validate_minimum(amount: Decimal, minimum: Decimal) -> Result<(), LedgerError> {
    validate_amount(amount)?;
    if amount < minimum {
        return Err(LedgerError::InvalidAmount(format!(
            "amount must be at least {minimum}"
        )));
    }
    Ok(())
}

/// Checks the caller's role for an operation.
///
/// # Errors
///
/// Returns `PermissionDenied` if the role does not match.
pub fn require_caller_role(role: Role, expected: Role, operation: &str) -> Result<(), LedgerError> {
    if role == expected {
        Ok(())
    } else {
        Err(LedgerError::PermissionDenied(format!(
            "only {expected} accounts can {operation}"
        )))
    }
}

/// Checks that an account may originate money movement.
///
/// # Errors
///
/// Returns `AccountInactive` unless the account is active.
pub fn require_active(account: &Account) -> Result<(), LedgerError> {
    if account.is_active() {
        Ok(())
    } else {
        Err(LedgerError::AccountInactive {
            mobile: account.mobile.clone(),
            status: account.status,
        })
    }
}

/// Checks a counterparty resolved by mobile: role first, then status.
///
/// The role check comes first so a wrong-role target is reported as such
/// whatever its status.
///
/// # Errors
///
/// Returns `RoleNotAllowed` or `AccountInactive`.
pub fn require_counterparty(account: &Account, expected: Role) -> Result<(), LedgerError> {
    if account.role != expected {
        return Err(LedgerError::RoleNotAllowed {
            expected,
            actual: account.role,
        });
    }
    require_active(account)
}

/// Trims a mobile number.
#[must_use]
pub fn normalize_mobile(mobile: &str) -> String {
    mobile.trim().to_string()
}

/// Trims and lowercases an email.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Initial status for a newly registered account.
#[must_use]
pub fn initial_status(role: Role) -> AccountStatus {
    match role {
        Role::User => AccountStatus::Active,
        Role::Agent | Role::Admin => AccountStatus::Pending,
    }
}
