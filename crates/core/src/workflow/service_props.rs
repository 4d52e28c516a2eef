//! Property-based tests for WorkflowService.

use proptest::prelude::*;
use swiftpay_shared::types::AccountId;
use uuid::Uuid;

use crate::ledger::AccountStatus;
use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{RequestStatus, Resolution, WorkflowAction};

fn arb_status() -> impl Strategy<Value = RequestStatus> {
    prop_oneof![
        Just(RequestStatus::Pending),
        Just(RequestStatus::Completed),
        Just(RequestStatus::Rejected),
    ]
}

fn arb_resolution() -> impl Strategy<Value = Resolution> {
    prop_oneof![Just(Resolution::Complete), Just(Resolution::Reject)]
}

fn arb_account_status() -> impl Strategy<Value = AccountStatus> {
    prop_oneof![
        Just(AccountStatus::Pending),
        Just(AccountStatus::Active),
        Just(AccountStatus::Blocked),
        Just(AccountStatus::Rejected),
    ]
}

fn arb_account_id() -> impl Strategy<Value = AccountId> {
    any::<u128>().prop_map(|n| AccountId::from_uuid(Uuid::from_u128(n)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Only pending requests resolve, and they land on the requested status.
    #[test]
    fn prop_resolve_only_from_pending(
        status in arb_status(),
        resolution in arb_resolution(),
        admin in arb_account_id(),
    ) {
        let result = WorkflowService::resolve(status, resolution, admin);
        if status == RequestStatus::Pending {
            let action = result.unwrap();
            prop_assert_eq!(action.new_status(), resolution.target_status());
            let (WorkflowAction::Complete { resolved_by, .. }
            | WorkflowAction::Reject { resolved_by, .. }) = action;
            prop_assert_eq!(resolved_by, admin);
        } else {
            prop_assert_eq!(
                result.unwrap_err(),
                WorkflowError::InvalidTransition { from: status, to: resolution.target_status() }
            );
        }
    }

    /// Terminal statuses never change, whatever the sequence of decisions.
    #[test]
    fn prop_terminal_is_final(
        resolutions in proptest::collection::vec(arb_resolution(), 1..10),
        admin in arb_account_id(),
    ) {
        let mut status = RequestStatus::Pending;
        let mut applied = 0;
        for resolution in resolutions {
            if let Ok(action) = WorkflowService::resolve(status, resolution, admin) {
                status = action.new_status();
                applied += 1;
            }
        }
        prop_assert_eq!(applied, 1);
        prop_assert!(status.is_terminal());
    }

    /// Account transitions never leave or enter `Rejected` except from `Pending`.
    #[test]
    fn prop_rejected_is_final(from in arb_account_status(), to in arb_account_status()) {
        let result = WorkflowService::change_account_status(from, to);
        if from == AccountStatus::Rejected {
            prop_assert!(result.is_err());
        }
        if to == AccountStatus::Rejected && from != AccountStatus::Pending {
            prop_assert!(result.is_err());
        }
        if to == AccountStatus::Pending {
            prop_assert!(result.is_err());
        }
        if let Ok(next) = result {
            prop_assert_eq!(next, to);
        }
    }
}
