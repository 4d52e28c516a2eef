//! Storage contract for the ledger.
//!
//! This trait pair is implemented by the db crate (Postgres) and by
//! [`MemoryLedgerStore`](super::MemoryLedgerStore). The engine performs every
//! mutation inside a [`LedgerUnit`]: all writes become visible together on
//! [`LedgerUnit::commit`], and a unit dropped without commit discards them.

use async_trait::async_trait;
use rust_decimal::Decimal;
use swiftpay_shared::types::{AccountId, PageRequest, TransactionId};

use super::error::LedgerError;
use super::types::{
    Account, AccountStatus, PendingRequest, Role, TransactionRecord, TransactionStatus,
    TransactionType,
};

/// Filter for account listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountFilter {
    /// Only accounts with this role.
    pub role: Option<Role>,
    /// Only accounts with this status.
    pub status: Option<AccountStatus>,
}

/// Filter for transaction listings. Results are newest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFilter {
    /// Only records where this account is sender or receiver.
    pub account: Option<AccountId>,
    /// Only records of this type.
    pub transaction_type: Option<TransactionType>,
    /// Only records in this status.
    pub status: Option<TransactionStatus>,
}

impl TransactionFilter {
    /// Returns true if the record passes the filter.
    #[must_use]
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.account.is_none_or(|id| record.involves(id))
            && self
                .transaction_type
                .is_none_or(|t| record.transaction_type() == t)
            && self.status.is_none_or(|s| record.status() == s)
    }
}

/// Aggregates over all accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountTotals {
    /// Sum of every balance (total system float).
    pub total_balance: Decimal,
    /// Sum of every income.
    pub total_income: Decimal,
    /// Accounts with role user.
    pub users: u64,
    /// Accounts with role agent.
    pub agents: u64,
    /// Accounts with role admin.
    pub admins: u64,
    /// Accounts awaiting approval.
    pub pending: u64,
    /// Blocked accounts.
    pub blocked: u64,
}

/// Read access and unit-of-work factory.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Opens a unit of work.
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>, LedgerError>;

    /// Inserts a new account.
    ///
    /// Returns `DuplicateAccount` naming the field if mobile, email or NID is taken.
    async fn insert_account(&self, account: &Account) -> Result<(), LedgerError>;

    /// Finds an account by ID.
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError>;

    /// Finds an account by mobile number.
    async fn find_account_by_mobile(&self, mobile: &str) -> Result<Option<Account>, LedgerError>;

    /// Finds an account by mobile number or (lowercase) email.
    async fn find_account_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, LedgerError>;

    /// Lists accounts, oldest first, with the total match count.
    async fn list_accounts(
        &self,
        filter: AccountFilter,
        page: PageRequest,
    ) -> Result<(Vec<Account>, u64), LedgerError>;

    /// Sums balances and counts accounts.
    async fn account_totals(&self) -> Result<AccountTotals, LedgerError>;

    /// Finds a transaction by ID.
    async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError>;

    /// Lists transactions, newest first, with the total match count.
    async fn list_transactions(
        &self,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<(Vec<TransactionRecord>, u64), LedgerError>;

    /// Counts transactions.
    async fn count_transactions(&self, filter: TransactionFilter) -> Result<u64, LedgerError>;
}

/// One atomic, isolated unit of work.
///
/// Rows returned by the `lock_*` methods stay locked against other units
/// until the unit commits or is dropped.
#[async_trait]
pub trait LedgerUnit: Send {
    /// Locks accounts and returns them in the order requested.
    ///
    /// Locks are taken in ascending ID order so that units touching the same
    /// accounts cannot deadlock. Returns `AccountNotFound` if any is missing.
    async fn lock_accounts(&mut self, ids: &[AccountId]) -> Result<Vec<Account>, LedgerError>;

    /// Locks a transaction.
    async fn lock_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError>;

    /// Writes an account's status, balance and income.
    async fn save_account(&mut self, account: &Account) -> Result<(), LedgerError>;

    /// Appends a transaction. Returns `DuplicateReference` if the reference exists.
    async fn insert_transaction(&mut self, record: &TransactionRecord) -> Result<(), LedgerError>;

    /// Writes a request's status, fee and resolution fields.
    async fn update_request(
        &mut self,
        id: TransactionId,
        request: &PendingRequest,
    ) -> Result<(), LedgerError>;

    /// Makes every write of this unit visible.
    async fn commit(self: Box<Self>) -> Result<(), LedgerError>;
}

/// Sorts and dedups IDs into lock order.
#[must_use]
pub fn lock_order(ids: &[AccountId]) -> Vec<AccountId> {
    let mut ordered = ids.to_vec();
    ordered.sort_unstable();
    ordered.dedup();
    ordered
}
