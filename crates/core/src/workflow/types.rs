//! Workflow domain types for the request approval lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use swiftpay_shared::types::AccountId;

use crate::ledger::PendingRequest;

/// Status of a balance or withdrawal request.
///
/// The valid transitions are:
/// - Pending → Completed (admin approves, balances move)
/// - Pending → Rejected (admin refuses, nothing moves)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Approved and applied (terminal).
    Completed,
    /// Refused (terminal).
    Rejected,
}

impl RequestStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true once the request can no longer change.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Admin decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Approve and apply.
    #[serde(rename = "completed")]
    Complete,
    /// Refuse.
    #[serde(rename = "rejected")]
    Reject,
}

impl Resolution {
    /// Parses a decision from its target status name.
    pub fn parse(s: &str) -> Option<Self> {
        match RequestStatus::parse(s)? {
            RequestStatus::Completed => Some(Self::Complete),
            RequestStatus::Rejected => Some(Self::Reject),
            RequestStatus::Pending => None,
        }
    }

    /// Status the request ends in.
    #[must_use]
    pub fn target_status(&self) -> RequestStatus {
        match self {
            Self::Complete => RequestStatus::Completed,
            Self::Reject => RequestStatus::Rejected,
        }
    }
}

/// Workflow action representing a resolution with audit data.
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// Complete a pending request.
    Complete {
        /// The admin who approved the request.
        resolved_by: AccountId,
        /// When the request was approved.
        resolved_at: DateTime<Utc>,
    },
    /// Reject a pending request.
    Reject {
        /// The admin who rejected the request.
        resolved_by: AccountId,
        /// When the request was rejected.
        resolved_at: DateTime<Utc>,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> RequestStatus {
        match self {
            Self::Complete { .. } => RequestStatus::Completed,
            Self::Reject { .. } => RequestStatus::Rejected,
        }
    }

    /// Returns true if balances move.
    #[must_use]
    pub fn moves_funds(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Writes status and audit fields onto a request.
    pub fn apply_to(&self, request: &mut PendingRequest) {
        let (Self::Complete {
            resolved_by,
            resolved_at,
        }
        | Self::Reject {
            resolved_by,
            resolved_at,
        }) = self;
        request.status = self.new_status();
        request.resolved_by = Some(*resolved_by);
        request.resolved_at = Some(*resolved_at);
    }
}
