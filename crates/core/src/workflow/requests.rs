//! Agent requests: submission and admin resolution.
//!
//! Submitting writes a `pending` record and moves nothing. Completing a
//! request moves balances and flips the status in one unit; rejecting only
//! flips the status.

use chrono::Utc;
use rust_decimal::Decimal;
use swiftpay_shared::types::{PageRequest, PageResponse, TransactionId};
use tracing::info;

use crate::ledger::error::LedgerError;
use crate::ledger::reference::generate_reference;
use crate::ledger::store::TransactionFilter;
use crate::ledger::types::{
    Caller, LedgerEvent, PendingRequest, RequestKind, Role, TransactionRecord,
};
use crate::ledger::validation::{require_active, require_caller_role, validate_amount};
use crate::ledger::LedgerEngine;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{RequestStatus, Resolution};

impl LedgerEngine {
    /// Asks the treasury for e-money float.
    ///
    /// Without an amount the configured default is requested.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless the caller is an agent, `AccountInactive`,
    /// `InvalidAmount` or `InvalidSecret`.
    pub async fn submit_balance_request(
        &self,
        caller: Caller,
        amount: Option<Decimal>,
        pin: &str,
        note: Option<String>,
    ) -> Result<TransactionRecord, LedgerError> {
        require_caller_role(caller.role, Role::Agent, "request balance")?;
        let amount = amount.unwrap_or(self.config().default_balance_request_amount);
        validate_amount(amount)?;
        let agent = self.load_account(caller.account_id).await?;
        require_active(&agent)?;
        self.verify_pin(&agent, pin).await?;

        let request = PendingRequest::new(
            RequestKind::BalanceRequest,
            agent.id,
            self.treasury(),
            amount,
        );
        let record = self
            .with_retry("submit_balance_request", || {
                self.insert_request(&request, note.as_deref())
            })
            .await?;

        info!(reference = %record.reference, agent = %agent.id, %amount, "balance request submitted");
        Ok(record)
    }

    /// Asks the treasury to pay out earned income.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless the caller is an agent, `AccountInactive`,
    /// `InvalidAmount`, `InvalidSecret`, or `InsufficientIncome` if the
    /// amount exceeds the agent's income.
    pub async fn submit_withdrawal_request(
        &self,
        caller: Caller,
        amount: Decimal,
        pin: &str,
        note: Option<String>,
    ) -> Result<TransactionRecord, LedgerError> {
        require_caller_role(caller.role, Role::Agent, "request withdrawals")?;
        validate_amount(amount)?;
        let agent = self.load_account(caller.account_id).await?;
        require_active(&agent)?;
        self.verify_pin(&agent, pin).await?;

        if agent.income < amount {
            return Err(LedgerError::InsufficientIncome {
                required: amount,
                available: agent.income,
            });
        }

        let request = PendingRequest::new(
            RequestKind::WithdrawalRequest,
            agent.id,
            self.treasury(),
            amount,
        );
        let record = self
            .with_retry("submit_withdrawal_request", || {
                self.insert_request(&request, note.as_deref())
            })
            .await?;

        info!(reference = %record.reference, agent = %agent.id, %amount, "withdrawal request submitted");
        Ok(record)
    }

    async fn insert_request(
        &self,
        request: &PendingRequest,
        note: Option<&str>,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut unit = self.store().begin().await?;
        let accounts = unit.lock_accounts(&[request.agent]).await?;
        let agent = accounts
            .first()
            .ok_or_else(|| LedgerError::AccountNotFound(request.agent.to_string()))?;
        require_active(agent)?;
        if request.kind == RequestKind::WithdrawalRequest && agent.income < request.amount {
            return Err(LedgerError::InsufficientIncome {
                required: request.amount,
                available: agent.income,
            });
        }

        let note = note.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
        let record = TransactionRecord::new(
            generate_reference(Utc::now()),
            note,
            LedgerEvent::Request(request.clone()),
        );
        unit.insert_transaction(&record).await?;
        unit.commit().await?;
        Ok(record)
    }

    /// Completes or rejects a pending request.
    ///
    /// A completed balance request credits the agent's balance with the
    /// requested amount. A completed withdrawal debits the agent's income,
    /// re-checked at this point; if it no longer covers the amount the
    /// request stays pending. Either way the treasury earns the request fee.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` unless the caller is an active admin
    /// - `TransactionNotFound` for an unknown ID or a non-request record
    /// - `AlreadyProcessed` if the request is no longer pending
    /// - `InsufficientIncome` when completing an uncovered withdrawal
    pub async fn resolve_request(
        &self,
        caller: Caller,
        id: TransactionId,
        resolution: Resolution,
    ) -> Result<TransactionRecord, LedgerError> {
        self.require_active_admin(caller, "resolve requests").await?;

        let record = self
            .with_retry("resolve_request", || {
                self.apply_resolution(caller, id, resolution)
            })
            .await?;

        info!(
            reference = %record.reference,
            admin = %caller.account_id,
            status = %record.status(),
            amount = %record.amount(),
            fee = %record.fee(),
            "request resolved"
        );
        Ok(record)
    }

    async fn apply_resolution(
        &self,
        caller: Caller,
        id: TransactionId,
        resolution: Resolution,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut unit = self.store().begin().await?;
        let mut record = unit
            .lock_transaction(id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id))?;
        let mut request = record
            .as_request()
            .cloned()
            .ok_or(LedgerError::TransactionNotFound(id))?;

        let action = WorkflowService::resolve(request.status, resolution, caller.account_id)
            .map_err(|_| LedgerError::AlreadyProcessed {
                reference: record.reference.clone(),
                status: request.status,
            })?;

        let mut accounts = Vec::new();
        if action.moves_funds() {
            let fee = self.fees().request_fee();
            let mut ids = vec![request.agent];
            if fee > Decimal::ZERO {
                ids.push(request.treasury);
            }
            accounts = unit.lock_accounts(&ids).await?;
            let (agent, rest) = accounts
                .split_first_mut()
                .ok_or_else(|| LedgerError::AccountNotFound(request.agent.to_string()))?;

            match request.kind {
                RequestKind::BalanceRequest => agent.credit_balance(request.amount),
                RequestKind::WithdrawalRequest => agent.debit_income(request.amount)?,
            }
            if let Some(treasury) = rest.first_mut() {
                treasury.credit_income(fee);
            }
            request.fee = fee;
        }
        action.apply_to(&mut request);

        for account in &accounts {
            unit.save_account(account).await?;
        }
        unit.update_request(id, &request).await?;
        unit.commit().await?;

        record.event = LedgerEvent::Request(request);
        Ok(record)
    }

    /// Lists requests of one kind, newest first. Admin only.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless the caller is an active admin.
    pub async fn list_requests(
        &self,
        caller: Caller,
        kind: RequestKind,
        status: Option<RequestStatus>,
        page: PageRequest,
    ) -> Result<PageResponse<TransactionRecord>, LedgerError> {
        self.require_active_admin(caller, "list requests").await?;
        let page = page.normalized();
        let filter = TransactionFilter {
            account: None,
            transaction_type: Some(kind.into()),
            status: status.map(Into::into),
        };
        let (records, total) = self.store().list_transactions(filter, page).await?;
        Ok(PageResponse::new(records, page, total))
    }
}
