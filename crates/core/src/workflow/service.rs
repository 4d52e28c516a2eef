//! Workflow service for request and account status transitions.
//!
//! Pure state machine logic. Executing a transition (moving balances,
//! persisting) is done by the ledger engine.

use chrono::Utc;
use swiftpay_shared::types::AccountId;

use crate::ledger::AccountStatus;
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{RequestStatus, Resolution, WorkflowAction};

/// Stateless service for workflow transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Resolves a request.
    ///
    /// # Returns
    /// * `Ok(WorkflowAction)` if the request is `Pending`
    /// * `Err(WorkflowError::InvalidTransition)` if it is already terminal
    pub fn resolve(
        current_status: RequestStatus,
        resolution: Resolution,
        resolved_by: AccountId,
    ) -> Result<WorkflowAction, WorkflowError> {
        if current_status != RequestStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: resolution.target_status(),
            });
        }

        let resolved_at = Utc::now();
        Ok(match resolution {
            Resolution::Complete => WorkflowAction::Complete {
                resolved_by,
                resolved_at,
            },
            Resolution::Reject => WorkflowAction::Reject {
                resolved_by,
                resolved_at,
            },
        })
    }

    /// Validates an admin-driven account status change.
    ///
    /// Allowed edges:
    /// - Pending → Active | Rejected (registration approval)
    /// - Active → Blocked, Blocked → Active (suspension)
    pub fn change_account_status(
        current: AccountStatus,
        target: AccountStatus,
    ) -> Result<AccountStatus, WorkflowError> {
        use AccountStatus::{Active, Blocked, Pending, Rejected};

        match (current, target) {
            (Pending, Active | Rejected) | (Active, Blocked) | (Blocked, Active) => Ok(target),
            _ => Err(WorkflowError::InvalidAccountTransition {
                from: current,
                to: target,
            }),
        }
    }
}
