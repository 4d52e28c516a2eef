//! Mobile-money ledger.
//!
//! This module implements the core ledger functionality:
//! - Account and transaction domain types
//! - Fee schedule and transaction references
//! - Business rule validation
//! - The storage contract and an in-memory store
//! - The ledger engine: transfers, account lifecycle and queries
//! - Error types for ledger operations

mod accounts;
pub mod engine;
pub mod error;
pub mod fees;
pub mod memory;
mod query;
pub mod reference;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod engine_props;
#[cfg(test)]
mod engine_tests;
#[cfg(test)]
mod fees_props;
#[cfg(test)]
mod validation_props;

pub use accounts::PIN_LENGTH;
pub use engine::LedgerEngine;
pub use error::{ErrorKind, LedgerError};
pub use fees::{CashOutFee, FeeSchedule};
pub use memory::{FailPoint, MemoryLedgerStore};
pub use query::{AgentStats, SystemStats};
pub use reference::{generate_reference, is_valid_reference};
pub use store::{
    AccountFilter, AccountTotals, LedgerStore, LedgerUnit, TransactionFilter, lock_order,
};
pub use types::{
    Account, AccountStatus, AccountView, Caller, InstantTransfer, LedgerEvent, NewAccount,
    PendingRequest, RecipientView, RequestKind, Role, TransactionRecord, TransactionStatus,
    TransactionType, TransactionView, TransferKind,
};
