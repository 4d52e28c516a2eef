//! Ledger error types.
//!
//! Every failure of a ledger, approval or account operation is one of these
//! variants. Each variant belongs to an [`ErrorKind`], which is what callers
//! branch on; the variant carries the detail for the message.

use rust_decimal::Decimal;
use swiftpay_shared::types::TransactionId;
use thiserror::Error;

use super::types::{AccountStatus, Role};
use crate::workflow::RequestStatus;

/// Coarse error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// Secret mismatch.
    Authentication,
    /// Caller may not perform the operation.
    Authorization,
    /// Referenced account or transaction does not exist.
    NotFound,
    /// Target already in a terminal or conflicting state.
    StateConflict,
    /// Balance or income check failed.
    InsufficientFunds,
    /// Storage failed to commit.
    Persistence,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount is zero, negative, below a floor or too precise.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Malformed input other than an amount.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Counterparty has the wrong role for this operation.
    #[error("Account role {actual} is not allowed here, expected {expected}")]
    RoleNotAllowed {
        /// Role the operation requires.
        expected: Role,
        /// Role the account has.
        actual: Role,
    },

    /// Sender and receiver are the same account.
    #[error("Cannot transfer to your own account")]
    SelfTransferNotAllowed,

    /// Account exists but is not active.
    #[error("Account {mobile} is {status}")]
    AccountInactive {
        /// Mobile number of the account.
        mobile: String,
        /// Its current status.
        status: AccountStatus,
    },

    /// Account status change not allowed.
    #[error("Cannot change account status from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: AccountStatus,
        /// Requested status.
        to: AccountStatus,
    },

    // ========== Authentication Errors ==========
    /// PIN did not verify.
    #[error("Invalid PIN")]
    InvalidSecret,

    /// Login identifier or PIN wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ========== Authorization Errors ==========
    /// Caller's role or identity does not permit the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // ========== Not Found Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Transaction not found, or not a request.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// No usable treasury account.
    #[error("Treasury account unavailable: {0}")]
    TreasuryUnavailable(String),

    // ========== State Conflict Errors ==========
    /// Request has already been resolved.
    #[error("Request {reference} has already been {status}")]
    AlreadyProcessed {
        /// Request reference.
        reference: String,
        /// Its terminal status.
        status: RequestStatus,
    },

    /// Mobile, email or NID already registered.
    #[error("An account with this {0} already exists")]
    DuplicateAccount(String),

    // ========== Funds Errors ==========
    /// Balance too low.
    #[error("Insufficient balance. Required: {required}, available: {available}")]
    InsufficientFunds {
        /// Amount needed.
        required: Decimal,
        /// Current balance.
        available: Decimal,
    },

    /// Income too low.
    #[error("Insufficient income. Required: {required}, available: {available}")]
    InsufficientIncome {
        /// Amount needed.
        required: Decimal,
        /// Current income.
        available: Decimal,
    },

    // ========== Persistence Errors ==========
    /// Lock conflict or serialization failure.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Generated reference collided with an existing one.
    #[error("Transaction reference already exists")]
    DuplicateReference,

    /// Storage failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_)
            | Self::InvalidInput(_)
            | Self::RoleNotAllowed { .. }
            | Self::SelfTransferNotAllowed
            | Self::AccountInactive { .. }
            | Self::InvalidStatusTransition { .. } => ErrorKind::Validation,
            Self::InvalidSecret | Self::InvalidCredentials => ErrorKind::Authentication,
            Self::PermissionDenied(_) => ErrorKind::Authorization,
            Self::AccountNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::TreasuryUnavailable(_) => ErrorKind::NotFound,
            Self::AlreadyProcessed { .. } | Self::DuplicateAccount(_) => ErrorKind::StateConflict,
            Self::InsufficientFunds { .. } | Self::InsufficientIncome { .. } => {
                ErrorKind::InsufficientFunds
            }
            Self::ConcurrentModification
            | Self::DuplicateReference
            | Self::Storage(_)
            | Self::Internal(_) => ErrorKind::Persistence,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::RoleNotAllowed { .. } => "ROLE_NOT_ALLOWED",
            Self::SelfTransferNotAllowed => "SELF_TRANSFER_NOT_ALLOWED",
            Self::AccountInactive { .. } => "ACCOUNT_INACTIVE",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::InvalidSecret => "INVALID_PIN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::TreasuryUnavailable(_) => "TREASURY_UNAVAILABLE",
            Self::AlreadyProcessed { .. } => "ALREADY_PROCESSED",
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InsufficientIncome { .. } => "INSUFFICIENT_INCOME",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::DuplicateReference => "DUPLICATE_REFERENCE",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InvalidAmount(_)
            | Self::InvalidInput(_)
            | Self::RoleNotAllowed { .. }
            | Self::SelfTransferNotAllowed
            | Self::AccountInactive { .. }
            | Self::InvalidStatusTransition { .. } => 400,

            // 401 Unauthorized - secret mismatch
            Self::InvalidSecret | Self::InvalidCredentials => 401,

            // 403 Forbidden
            Self::PermissionDenied(_) => 403,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::TransactionNotFound(_) => 404,

            // 409 Conflict - state and concurrency errors
            Self::AlreadyProcessed { .. }
            | Self::DuplicateAccount(_)
            | Self::ConcurrentModification
            | Self::DuplicateReference => 409,

            // 422 Unprocessable - funds checks
            Self::InsufficientFunds { .. } | Self::InsufficientIncome { .. } => 422,

            // 500 Internal Server Error
            Self::Storage(_) | Self::Internal(_) => 500,

            // 503 Service Unavailable
            Self::TreasuryUnavailable(_) => 503,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification | Self::DuplicateReference)
    }
}
