//! Ledger engine: validates and executes money movement.
//!
//! Every operation follows the same template:
//! 1. Check the caller's role and the input
//! 2. Resolve the counterparty and check its role and status
//! 3. Verify the caller's PIN
//! 4. Compute the fee and pre-check funds on an unlocked snapshot
//! 5. Open a unit, lock the touched accounts, re-check, mutate, append the record
//! 6. Commit, retrying retryable storage conflicts

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use swiftpay_shared::LedgerConfig;
use swiftpay_shared::types::{AccountId, PageRequest};
use tracing::{error, info, warn};

use super::error::{ErrorKind, LedgerError};
use super::fees::FeeSchedule;
use super::reference::generate_reference;
use super::store::{AccountFilter, LedgerStore, LedgerUnit};
use super::types::{
    Account, AccountStatus, Caller, InstantTransfer, LedgerEvent, Role, TransactionRecord,
    TransferKind,
};
use super::validation::{
    require_active, require_caller_role, require_counterparty, validate_amount, validate_minimum,
};
use crate::auth::SecretVerifier;

/// Executes ledger operations against a [`LedgerStore`].
///
/// Cheap to share behind an `Arc`; all state lives in the store.
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    verifier: Arc<dyn SecretVerifier>,
    treasury: AccountId,
    fees: FeeSchedule,
    config: LedgerConfig,
}

impl std::fmt::Debug for LedgerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerEngine")
            .field("treasury", &self.treasury)
            .field("fees", &self.fees)
            .finish_non_exhaustive()
    }
}

impl LedgerEngine {
    /// Creates an engine. `treasury` must be an admin account; see
    /// [`LedgerEngine::resolve_treasury`].
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        verifier: Arc<dyn SecretVerifier>,
        treasury: AccountId,
        config: LedgerConfig,
    ) -> Self {
        Self {
            store,
            verifier,
            treasury,
            fees: FeeSchedule::from_config(&config),
            config,
        }
    }

    /// Finds the treasury account.
    ///
    /// A configured ID must name an existing admin account. Without one, the
    /// store must hold exactly one active admin account; pending and
    /// rejected sign-ups are ignored.
    ///
    /// # Errors
    ///
    /// Returns `TreasuryUnavailable` if no single admin account qualifies.
    pub async fn resolve_treasury(
        store: &dyn LedgerStore,
        configured: Option<AccountId>,
    ) -> Result<AccountId, LedgerError> {
        if let Some(id) = configured {
            return match store.find_account(id).await? {
                Some(account) if account.role == Role::Admin => Ok(account.id),
                Some(account) => Err(LedgerError::TreasuryUnavailable(format!(
                    "configured account {id} is a {} account",
                    account.role
                ))),
                None => Err(LedgerError::TreasuryUnavailable(format!(
                    "configured account {id} does not exist"
                ))),
            };
        }

        let filter = AccountFilter {
            role: Some(Role::Admin),
            status: Some(AccountStatus::Active),
        };
        let (admins, total) = store.list_accounts(filter, PageRequest::new(1, 2)).await?;
        match (admins.first(), total) {
            (Some(admin), 1) => Ok(admin.id),
            (_, 0) => Err(LedgerError::TreasuryUnavailable(
                "no active admin account exists".to_string(),
            )),
            _ => Err(LedgerError::TreasuryUnavailable(format!(
                "{total} active admin accounts exist, configure ledger.treasury_account_id"
            ))),
        }
    }

    /// The treasury account ID.
    #[must_use]
    pub fn treasury(&self) -> AccountId {
        self.treasury
    }

    /// The fee schedule in effect.
    #[must_use]
    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// The ledger policy in effect.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub(crate) fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    pub(crate) async fn load_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.store
            .find_account(id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))
    }

    /// Checks that the caller is an admin by token and by its stored account,
    /// and that the account is active.
    ///
    /// Non-admin tokens are rejected before the lookup.
    pub(crate) async fn require_active_admin(
        &self,
        caller: Caller,
        operation: &str,
    ) -> Result<Account, LedgerError> {
        require_caller_role(caller.role, Role::Admin, operation)?;
        let admin = self
            .store
            .find_account(caller.account_id)
            .await?
            .filter(|account| account.role == Role::Admin && account.is_active());
        admin.ok_or_else(|| {
            warn!(account_id = %caller.account_id, operation, "admin operation by inactive account");
            LedgerError::PermissionDenied(format!("only active admin accounts can {operation}"))
        })
    }

    pub(crate) async fn load_counterparty(&self, mobile: &str) -> Result<Account, LedgerError> {
        let mobile = mobile.trim();
        if mobile.is_empty() {
            return Err(LedgerError::InvalidInput("mobile number is required".to_string()));
        }
        self.store
            .find_account_by_mobile(mobile)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(mobile.to_string()))
    }

    /// Verifies a PIN on the blocking pool. A panicked or cancelled
    /// verification counts as a mismatch.
    pub(crate) async fn verify_pin(&self, account: &Account, pin: &str) -> Result<(), LedgerError> {
        let verifier = Arc::clone(&self.verifier);
        let pin = pin.to_string();
        let hash = account.pin_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verifier.verify(&pin, &hash))
            .await
            .unwrap_or(false);
        if verified {
            Ok(())
        } else {
            warn!(account_id = %account.id, "PIN verification failed");
            Err(LedgerError::InvalidSecret)
        }
    }

    pub(crate) async fn hash_pin(&self, pin: &str) -> Result<String, LedgerError> {
        let verifier = Arc::clone(&self.verifier);
        let pin = pin.to_string();
        tokio::task::spawn_blocking(move || verifier.hash(&pin))
            .await
            .map_err(|e| LedgerError::Internal(e.to_string()))?
            .map_err(|e| LedgerError::Internal(e.to_string()))
    }

    /// Runs `attempt` until it succeeds, fails with a non-retryable error, or
    /// `max_attempts` is reached.
    pub(crate) async fn with_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> Result<T, LedgerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LedgerError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut tries = 1;
        loop {
            match attempt().await {
                Err(err) if err.is_retryable() && tries < max_attempts => {
                    warn!(operation, attempt = tries, error = %err, "retrying ledger operation");
                    tries += 1;
                }
                Err(err) => {
                    if err.kind() == ErrorKind::Persistence {
                        error!(operation, attempts = tries, error = %err, "ledger operation failed");
                    }
                    return Err(err);
                }
                Ok(value) => return Ok(value),
            }
        }
    }

    /// Sends money from one user to another.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` unless the caller is a user
    /// - `InvalidAmount` below the send-money minimum
    /// - `AccountNotFound`, `RoleNotAllowed`, `AccountInactive` for the receiver
    /// - `SelfTransferNotAllowed` when sending to oneself
    /// - `InvalidSecret` on a wrong PIN
    /// - `InsufficientFunds` if the balance does not cover amount plus fee
    pub async fn send_money(
        &self,
        caller: Caller,
        receiver_mobile: &str,
        amount: Decimal,
        pin: &str,
    ) -> Result<TransactionRecord, LedgerError> {
        // 1. Caller and amount
        require_caller_role(caller.role, Role::User, "send money")?;
        validate_minimum(amount, self.config.send_money_min_amount)?;
        let sender = self.load_account(caller.account_id).await?;
        require_active(&sender)?;

        // 2. Receiver, role before anything involving the PIN
        let receiver = self.load_counterparty(receiver_mobile).await?;
        require_counterparty(&receiver, Role::User)?;
        if receiver.id == sender.id {
            return Err(LedgerError::SelfTransferNotAllowed);
        }

        // 3. PIN
        self.verify_pin(&sender, pin).await?;

        // 4. Fee and funds
        let fee = self.fees.send_money_fee(amount);
        check_funds(&sender, amount + fee)?;

        // 5-6. Atomic apply
        let transfer = InstantTransfer {
            kind: TransferKind::SendMoney,
            sender: sender.id,
            receiver: receiver.id,
            amount,
            fee,
        };
        let record = self
            .with_retry("send_money", || self.apply_send_money(&transfer))
            .await?;

        info!(
            reference = %record.reference,
            sender = %transfer.sender,
            receiver = %transfer.receiver,
            %amount,
            %fee,
            "send-money completed"
        );
        Ok(record)
    }

    async fn apply_send_money(
        &self,
        transfer: &InstantTransfer,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut unit = self.store.begin().await?;
        let mut ids = vec![transfer.sender, transfer.receiver];
        if transfer.fee > Decimal::ZERO {
            ids.push(self.treasury);
        }
        let mut accounts = unit.lock_accounts(&ids).await?;

        let (sender, rest) = split_first(&mut accounts)?;
        let (receiver, rest) = split_first(rest)?;
        require_active(sender)?;
        require_counterparty(receiver, Role::User)?;

        sender.debit_balance(transfer.amount + transfer.fee)?;
        receiver.credit_balance(transfer.amount);
        if let Some(treasury) = rest.first_mut() {
            treasury.credit_income(transfer.fee);
        }

        commit_transfer(unit, &accounts, transfer.clone()).await
    }

    /// Cashes out e-money at an agent. The user pays amount plus fee; the
    /// agent hands over cash from its float and earns its fee share.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` unless the caller is a user
    /// - `InvalidAmount` for a non-positive amount
    /// - `AccountNotFound`, `RoleNotAllowed`, `AccountInactive` for the agent
    /// - `InvalidSecret` on a wrong PIN
    /// - `InsufficientFunds` if the user's balance or the agent's float is short
    pub async fn cash_out(
        &self,
        caller: Caller,
        agent_mobile: &str,
        amount: Decimal,
        pin: &str,
    ) -> Result<TransactionRecord, LedgerError> {
        require_caller_role(caller.role, Role::User, "cash out")?;
        validate_amount(amount)?;
        let user = self.load_account(caller.account_id).await?;
        require_active(&user)?;

        let agent = self.load_counterparty(agent_mobile).await?;
        require_counterparty(&agent, Role::Agent)?;

        self.verify_pin(&user, pin).await?;

        let fee = self.fees.cash_out_fee(amount);
        check_funds(&user, amount + fee.total())?;
        check_funds(&agent, amount)?;

        let transfer = InstantTransfer {
            kind: TransferKind::CashOut,
            sender: user.id,
            receiver: agent.id,
            amount,
            fee: fee.total(),
        };
        let record = self
            .with_retry("cash_out", || {
                self.apply_cash_out(&transfer, fee.agent_share, fee.treasury_share)
            })
            .await?;

        info!(
            reference = %record.reference,
            user = %transfer.sender,
            agent = %transfer.receiver,
            %amount,
            agent_share = %fee.agent_share,
            treasury_share = %fee.treasury_share,
            "cash-out completed"
        );
        Ok(record)
    }

    async fn apply_cash_out(
        &self,
        transfer: &InstantTransfer,
        agent_share: Decimal,
        treasury_share: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut unit = self.store.begin().await?;
        let mut ids = vec![transfer.sender, transfer.receiver];
        if treasury_share > Decimal::ZERO {
            ids.push(self.treasury);
        }
        let mut accounts = unit.lock_accounts(&ids).await?;

        let (user, rest) = split_first(&mut accounts)?;
        let (agent, rest) = split_first(rest)?;
        require_active(user)?;
        require_counterparty(agent, Role::Agent)?;

        user.debit_balance(transfer.amount + transfer.fee)?;
        agent.debit_balance(transfer.amount)?;
        agent.credit_income(agent_share);
        if let Some(treasury) = rest.first_mut() {
            treasury.credit_income(treasury_share);
        }

        commit_transfer(unit, &accounts, transfer.clone()).await
    }

    /// Credits a user's e-money against cash handed to an agent.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` unless the caller is an agent
    /// - `InvalidAmount` for a non-positive amount
    /// - `AccountInactive` if the agent is not active
    /// - `AccountNotFound`, `RoleNotAllowed`, `AccountInactive` for the user
    /// - `InvalidSecret` on a wrong PIN
    /// - `InsufficientFunds` if the agent's float is short
    pub async fn cash_in(
        &self,
        caller: Caller,
        user_mobile: &str,
        amount: Decimal,
        pin: &str,
    ) -> Result<TransactionRecord, LedgerError> {
        require_caller_role(caller.role, Role::Agent, "cash in")?;
        validate_amount(amount)?;
        let agent = self.load_account(caller.account_id).await?;
        require_active(&agent)?;

        let user = self.load_counterparty(user_mobile).await?;
        require_counterparty(&user, Role::User)?;

        self.verify_pin(&agent, pin).await?;
        check_funds(&agent, amount)?;

        let transfer = InstantTransfer {
            kind: TransferKind::CashIn,
            sender: agent.id,
            receiver: user.id,
            amount,
            fee: Decimal::ZERO,
        };
        let record = self
            .with_retry("cash_in", || self.apply_cash_in(&transfer))
            .await?;

        info!(
            reference = %record.reference,
            agent = %transfer.sender,
            user = %transfer.receiver,
            %amount,
            "cash-in completed"
        );
        Ok(record)
    }

    async fn apply_cash_in(
        &self,
        transfer: &InstantTransfer,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut unit = self.store.begin().await?;
        let mut accounts = unit
            .lock_accounts(&[transfer.sender, transfer.receiver])
            .await?;

        let (agent, rest) = split_first(&mut accounts)?;
        let (user, _) = split_first(rest)?;
        require_active(agent)?;
        require_counterparty(user, Role::User)?;

        agent.debit_balance(transfer.amount)?;
        user.credit_balance(transfer.amount);

        commit_transfer(unit, &accounts, transfer.clone()).await
    }
}

fn check_funds(account: &Account, required: Decimal) -> Result<(), LedgerError> {
    if account.balance < required {
        return Err(LedgerError::InsufficientFunds {
            required,
            available: account.balance,
        });
    }
    Ok(())
}

fn split_first(accounts: &mut [Account]) -> Result<(&mut Account, &mut [Account]), LedgerError> {
    accounts
        .split_first_mut()
        .ok_or_else(|| LedgerError::Internal("store returned fewer accounts than locked".to_string()))
}

/// Saves the mutated accounts, appends the record and commits.
async fn commit_accounts(
    mut unit: Box<dyn LedgerUnit>,
    accounts: &[Account],
    record: TransactionRecord,
) -> Result<TransactionRecord, LedgerError> {
    for account in accounts {
        unit.save_account(account).await?;
    }
    unit.insert_transaction(&record).await?;
    unit.commit().await?;
    Ok(record)
}

async fn commit_transfer(
    unit: Box<dyn LedgerUnit>,
    accounts: &[Account],
    transfer: InstantTransfer,
) -> Result<TransactionRecord, LedgerError> {
    let record = TransactionRecord::new(
        generate_reference(Utc::now()),
        None,
        LedgerEvent::Transfer(transfer),
    );
    commit_accounts(unit, accounts, record).await
}
