//! Workflow error types.

use thiserror::Error;

use crate::ledger::AccountStatus;
use crate::workflow::types::RequestStatus;

/// Errors from the request and account status state machines.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// Attempted an invalid request status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: RequestStatus,
        /// The attempted target status.
        to: RequestStatus,
    },

    /// Attempted an invalid account status transition.
    #[error("Invalid account status transition from {from} to {to}")]
    InvalidAccountTransition {
        /// The current status.
        from: AccountStatus,
        /// The attempted target status.
        to: AccountStatus,
    },
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } => 409,
            Self::InvalidAccountTransition { .. } => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InvalidAccountTransition { .. } => "INVALID_ACCOUNT_TRANSITION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_error() {
        let err = WorkflowError::InvalidTransition {
            from: RequestStatus::Completed,
            to: RequestStatus::Rejected,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert!(err.to_string().contains("completed"));
        assert!(err.to_string().contains("rejected"));
    }

    #[test]
    fn test_invalid_account_transition_error() {
        let err = WorkflowError::InvalidAccountTransition {
            from: AccountStatus::Rejected,
            to: AccountStatus::Active,
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_ACCOUNT_TRANSITION");
    }
}
