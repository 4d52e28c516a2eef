//! Request workflow for SwiftPay.
//!
//! This module implements the pending-request lifecycle and the account
//! status lifecycle as pure state machines, plus the engine operations that
//! submit and resolve balance and withdrawal requests.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (RequestStatus, Resolution, WorkflowAction)
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic
//! - `requests` - Request submission and resolution on the ledger engine

pub mod error;
mod requests;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use service::WorkflowService;
pub use types::{RequestStatus, Resolution, WorkflowAction};
