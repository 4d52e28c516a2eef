//! Read-only queries over accounts and the transaction log.

use rust_decimal::Decimal;
use serde::Serialize;
use swiftpay_shared::types::{AccountId, PageRequest, PageResponse};

use super::LedgerEngine;
use super::error::LedgerError;
use super::store::TransactionFilter;
use super::types::{Caller, Role, TransactionRecord, TransactionStatus, TransactionType};
use super::validation::require_caller_role;

/// System-wide figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    /// Sum of every account balance.
    pub total_balance: Decimal,
    /// Income collected by the treasury.
    pub treasury_income: Decimal,
    /// Sum of every account income, treasury included.
    pub total_income: Decimal,
    /// User accounts.
    pub users: u64,
    /// Agent accounts.
    pub agents: u64,
    /// Admin accounts.
    pub admins: u64,
    /// Accounts awaiting approval.
    pub pending_accounts: u64,
    /// Blocked accounts.
    pub blocked_accounts: u64,
    /// All transaction records.
    pub transactions: u64,
    /// Requests awaiting a decision.
    pub pending_requests: u64,
}

/// An agent's own figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentStats {
    /// Float.
    pub balance: Decimal,
    /// Earned income.
    pub income: Decimal,
    /// Own balance requests awaiting a decision.
    pub pending_balance_requests: u64,
    /// Own withdrawal requests awaiting a decision.
    pub pending_withdrawal_requests: u64,
    /// Records the agent takes part in.
    pub transactions: u64,
}

impl LedgerEngine {
    /// Transactions where the account is sender or receiver, newest first.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless the caller owns the account or is an active admin.
    pub async fn transactions_for_account(
        &self,
        caller: Caller,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<PageResponse<TransactionRecord>, LedgerError> {
        if caller.account_id != account_id {
            self.require_active_admin(caller, "view other accounts' transactions").await?;
        }
        let page = page.normalized();
        let filter = TransactionFilter {
            account: Some(account_id),
            ..TransactionFilter::default()
        };
        let (records, total) = self.store().list_transactions(filter, page).await?;
        Ok(PageResponse::new(records, page, total))
    }

    /// Every transaction, newest first. Admin only.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless the caller is an active admin.
    pub async fn all_transactions(
        &self,
        caller: Caller,
        page: PageRequest,
    ) -> Result<PageResponse<TransactionRecord>, LedgerError> {
        self.require_active_admin(caller, "view all transactions").await?;
        let page = page.normalized();
        let (records, total) = self
            .store()
            .list_transactions(TransactionFilter::default(), page)
            .await?;
        Ok(PageResponse::new(records, page, total))
    }

    /// Admin dashboard figures.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless the caller is an active admin.
    pub async fn system_stats(&self, caller: Caller) -> Result<SystemStats, LedgerError> {
        self.require_active_admin(caller, "view system stats").await?;
        let store = self.store();
        let totals = store.account_totals().await?;
        let treasury = self.load_account(self.treasury()).await?;
        let transactions = store.count_transactions(TransactionFilter::default()).await?;
        let pending_requests = store
            .count_transactions(TransactionFilter {
                status: Some(TransactionStatus::Pending),
                ..TransactionFilter::default()
            })
            .await?;

        Ok(SystemStats {
            total_balance: totals.total_balance,
            treasury_income: treasury.income,
            total_income: totals.total_income,
            users: totals.users,
            agents: totals.agents,
            admins: totals.admins,
            pending_accounts: totals.pending,
            blocked_accounts: totals.blocked,
            transactions,
            pending_requests,
        })
    }

    /// The calling agent's dashboard figures.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless the caller is an agent.
    pub async fn agent_stats(&self, caller: Caller) -> Result<AgentStats, LedgerError> {
        require_caller_role(caller.role, Role::Agent, "view agent stats")?;
        let agent = self.load_account(caller.account_id).await?;
        let store = self.store();

        let own_pending = |transaction_type| TransactionFilter {
            account: Some(agent.id),
            transaction_type: Some(transaction_type),
            status: Some(TransactionStatus::Pending),
        };
        let pending_balance_requests = store
            .count_transactions(own_pending(TransactionType::BalanceRequest))
            .await?;
        let pending_withdrawal_requests = store
            .count_transactions(own_pending(TransactionType::WithdrawalRequest))
            .await?;
        let transactions = store
            .count_transactions(TransactionFilter {
                account: Some(agent.id),
                ..TransactionFilter::default()
            })
            .await?;

        Ok(AgentStats {
            balance: agent.balance,
            income: agent.income,
            pending_balance_requests,
            pending_withdrawal_requests,
            transactions,
        })
    }
}
