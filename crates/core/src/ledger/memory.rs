//! In-memory ledger store.
//!
//! State lives behind one async mutex. A unit of work holds the mutex for its
//! whole life, which makes units fully serializable. Writes are staged in the
//! unit and applied on commit.
//!
//! Reads through the store wait while a unit is open, so code holding a unit
//! must only read through that unit.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use swiftpay_shared::types::{AccountId, PageRequest, TransactionId};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::LedgerError;
use super::store::{
    AccountFilter, AccountTotals, LedgerStore, LedgerUnit, TransactionFilter, lock_order,
};
use super::types::{Account, AccountStatus, LedgerEvent, PendingRequest, Role, TransactionRecord};

/// Storage failure to inject into the next unit that reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// Fail the account save after `after` successful saves in the unit.
    AccountSave {
        /// Saves allowed before the failure.
        after: usize,
    },
    /// Fail the transaction insert.
    TransactionInsert,
    /// Fail the request update.
    RequestUpdate,
    /// Fail the commit with a non-retryable error.
    Commit,
    /// Fail the commit with a retryable conflict.
    CommitConflict,
}

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<AccountId, Account>,
    transactions: Vec<TransactionRecord>,
    references: HashSet<String>,
    fail_points: Vec<FailPoint>,
}

impl MemoryState {
    fn take_fail_point(&mut self, pred: impl Fn(&FailPoint) -> bool) -> Option<FailPoint> {
        let idx = self.fail_points.iter().position(pred)?;
        Some(self.fail_points.remove(idx))
    }

    fn duplicate_field(&self, account: &Account) -> Option<&'static str> {
        self.accounts.values().find_map(|existing| {
            if existing.mobile == account.mobile {
                Some("mobile")
            } else if existing.email == account.email {
                Some("email")
            } else if existing.nid == account.nid {
                Some("nid")
            } else {
                None
            }
        })
    }
}

/// In-memory [`LedgerStore`] with failure injection.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-shot failure.
    pub async fn inject(&self, point: FailPoint) {
        self.state.lock().await.fail_points.push(point);
    }

    /// Returns every stored transaction in insertion order.
    pub async fn transactions(&self) -> Vec<TransactionRecord> {
        self.state.lock().await.transactions.clone()
    }

    /// Returns every stored account.
    pub async fn accounts(&self) -> Vec<Account> {
        self.state.lock().await.accounts.values().cloned().collect()
    }
}

fn page_of<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    items.iter().skip(offset).take(limit).cloned().collect()
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>, LedgerError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemoryUnit {
            guard,
            accounts: HashMap::new(),
            inserts: Vec::new(),
            updates: Vec::new(),
            saves: 0,
        }))
    }

    async fn insert_account(&self, account: &Account) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;
        if let Some(field) = state.duplicate_field(account) {
            return Err(LedgerError::DuplicateAccount(field.to_string()));
        }
        state.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        Ok(self.state.lock().await.accounts.get(&id).cloned())
    }

    async fn find_account_by_mobile(&self, mobile: &str) -> Result<Option<Account>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.accounts.values().find(|a| a.mobile == mobile).cloned())
    }

    async fn find_account_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, LedgerError> {
        let state = self.state.lock().await;
        let email = identifier.to_lowercase();
        Ok(state
            .accounts
            .values()
            .find(|a| a.mobile == identifier || a.email == email)
            .cloned())
    }

    async fn list_accounts(
        &self,
        filter: AccountFilter,
        page: PageRequest,
    ) -> Result<(Vec<Account>, u64), LedgerError> {
        let state = self.state.lock().await;
        let mut matching: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| filter.role.is_none_or(|r| a.role == r))
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .cloned()
            .collect();
        matching.sort_by_key(|a| (a.created_at, a.id));
        let total = matching.len() as u64;
        Ok((page_of(&matching, page), total))
    }

    async fn account_totals(&self) -> Result<AccountTotals, LedgerError> {
        let state = self.state.lock().await;
        let mut totals = AccountTotals::default();
        for account in state.accounts.values() {
            totals.total_balance += account.balance;
            totals.total_income += account.income;
            match account.role {
                Role::User => totals.users += 1,
                Role::Agent => totals.agents += 1,
                Role::Admin => totals.admins += 1,
            }
            match account.status {
                AccountStatus::Pending => totals.pending += 1,
                AccountStatus::Blocked => totals.blocked += 1,
                AccountStatus::Active | AccountStatus::Rejected => {}
            }
        }
        Ok(totals)
    }

    async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.transactions.iter().find(|t| t.id == id).cloned())
    }

    async fn list_transactions(
        &self,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<(Vec<TransactionRecord>, u64), LedgerError> {
        let state = self.state.lock().await;
        let matching: Vec<TransactionRecord> = state
            .transactions
            .iter()
            .rev()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        Ok((page_of(&matching, page), total))
    }

    async fn count_transactions(&self, filter: TransactionFilter) -> Result<u64, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.transactions.iter().filter(|t| filter.matches(t)).count() as u64)
    }
}

struct MemoryUnit {
    guard: OwnedMutexGuard<MemoryState>,
    accounts: HashMap<AccountId, Account>,
    inserts: Vec<TransactionRecord>,
    updates: Vec<(TransactionId, PendingRequest)>,
    saves: usize,
}

impl MemoryUnit {
    fn current_account(&self, id: AccountId) -> Option<Account> {
        self.accounts
            .get(&id)
            .or_else(|| self.guard.accounts.get(&id))
            .cloned()
    }

    fn current_transaction(&self, id: TransactionId) -> Option<TransactionRecord> {
        let mut record = self
            .inserts
            .iter()
            .chain(self.guard.transactions.iter())
            .find(|t| t.id == id)
            .cloned()?;
        if let Some((_, request)) = self.updates.iter().rev().find(|(uid, _)| *uid == id) {
            record.event = LedgerEvent::Request(request.clone());
        }
        Some(record)
    }
}

#[async_trait]
impl LedgerUnit for MemoryUnit {
    async fn lock_accounts(&mut self, ids: &[AccountId]) -> Result<Vec<Account>, LedgerError> {
        for id in lock_order(ids) {
            if self.current_account(id).is_none() {
                return Err(LedgerError::AccountNotFound(id.to_string()));
            }
        }
        ids.iter()
            .map(|id| {
                self.current_account(*id)
                    .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))
            })
            .collect()
    }

    async fn lock_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        Ok(self.current_transaction(id))
    }

    async fn save_account(&mut self, account: &Account) -> Result<(), LedgerError> {
        let saves = self.saves;
        if self
            .guard
            .take_fail_point(|p| matches!(p, FailPoint::AccountSave { after } if *after == saves))
            .is_some()
        {
            return Err(LedgerError::Storage("injected account save failure".to_string()));
        }
        self.saves += 1;
        self.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn insert_transaction(&mut self, record: &TransactionRecord) -> Result<(), LedgerError> {
        if self
            .guard
            .take_fail_point(|p| *p == FailPoint::TransactionInsert)
            .is_some()
        {
            return Err(LedgerError::Storage("injected insert failure".to_string()));
        }
        let taken = self.guard.references.contains(&record.reference)
            || self.inserts.iter().any(|t| t.reference == record.reference);
        if taken {
            return Err(LedgerError::DuplicateReference);
        }
        self.inserts.push(record.clone());
        Ok(())
    }

    async fn update_request(
        &mut self,
        id: TransactionId,
        request: &PendingRequest,
    ) -> Result<(), LedgerError> {
        if self
            .guard
            .take_fail_point(|p| *p == FailPoint::RequestUpdate)
            .is_some()
        {
            return Err(LedgerError::Storage("injected update failure".to_string()));
        }
        if self.current_transaction(id).is_none() {
            return Err(LedgerError::TransactionNotFound(id));
        }
        self.updates.push((id, request.clone()));
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), LedgerError> {
        match self
            .guard
            .take_fail_point(|p| matches!(p, FailPoint::Commit | FailPoint::CommitConflict))
        {
            Some(FailPoint::CommitConflict) => return Err(LedgerError::ConcurrentModification),
            Some(_) => return Err(LedgerError::Storage("injected commit failure".to_string())),
            None => {}
        }

        let MemoryUnit {
            mut guard,
            accounts,
            inserts,
            updates,
            ..
        } = *self;
        guard.accounts.extend(accounts);
        for record in inserts {
            guard.references.insert(record.reference.clone());
            guard.transactions.push(record);
        }
        for (id, request) in updates {
            if let Some(record) = guard.transactions.iter_mut().find(|t| t.id == id) {
                record.event = LedgerEvent::Request(request);
            }
        }
        Ok(())
    }
}
