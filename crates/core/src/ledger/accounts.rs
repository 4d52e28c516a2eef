//! Account lifecycle: registration, credential checks, admin status changes.

use chrono::Utc;
use rust_decimal::Decimal;
use swiftpay_shared::types::{AccountId, PageRequest, PageResponse};
use tracing::{info, warn};
use validator::ValidateEmail;

use super::LedgerEngine;
use super::error::LedgerError;
use super::store::AccountFilter;
use super::types::{Account, AccountStatus, Caller, NewAccount, RecipientView, Role};
use super::validation::{initial_status, normalize_email, normalize_mobile};
use crate::workflow::WorkflowService;

/// Length of an account PIN.
pub const PIN_LENGTH: usize = 5;

fn validate_new_account(input: &NewAccount) -> Result<(), LedgerError> {
    for (field, value) in [
        ("name", &input.name),
        ("mobile", &input.mobile),
        ("nid", &input.nid),
    ] {
        if value.trim().is_empty() {
            return Err(LedgerError::InvalidInput(format!("{field} is required")));
        }
    }
    if !input.email.trim().validate_email() {
        return Err(LedgerError::InvalidInput("email is not valid".to_string()));
    }
    if input.pin.len() != PIN_LENGTH || !input.pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::InvalidInput(format!(
            "PIN must be exactly {PIN_LENGTH} digits"
        )));
    }
    Ok(())
}

impl LedgerEngine {
    fn initial_balance(&self, role: Role) -> Decimal {
        let config = self.config();
        match role {
            Role::User => config.initial_user_balance,
            Role::Agent => config.initial_agent_balance,
            Role::Admin => config.initial_admin_balance,
        }
    }

    /// Registers an account with its role's opening balance and status.
    ///
    /// Users start active; agents and admins wait for approval.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for malformed fields, `DuplicateAccount` if the mobile,
    /// email or NID is taken.
    pub async fn register(&self, input: NewAccount) -> Result<Account, LedgerError> {
        validate_new_account(&input)?;
        let pin_hash = self.hash_pin(&input.pin).await?;

        let account = Account {
            id: AccountId::new(),
            name: input.name.trim().to_string(),
            mobile: normalize_mobile(&input.mobile),
            email: normalize_email(&input.email),
            nid: input.nid.trim().to_string(),
            role: input.role,
            status: initial_status(input.role),
            balance: self.initial_balance(input.role),
            income: Decimal::ZERO,
            pin_hash,
            created_at: Utc::now(),
        };
        self.store().insert_account(&account).await?;

        info!(account_id = %account.id, role = %account.role, status = %account.status, "account registered");
        Ok(account)
    }

    /// Checks a mobile-or-email identifier and PIN.
    ///
    /// Any status may log in; money movement checks status separately.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown identifier or a wrong PIN.
    pub async fn login(&self, identifier: &str, pin: &str) -> Result<Account, LedgerError> {
        let identifier = identifier.trim();
        let Some(account) = self.store().find_account_by_identifier(identifier).await? else {
            warn!("login with unknown identifier");
            return Err(LedgerError::InvalidCredentials);
        };
        self.verify_pin(&account, pin)
            .await
            .map_err(|_| LedgerError::InvalidCredentials)?;
        Ok(account)
    }

    /// Returns the caller's own account.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if the account no longer exists.
    pub async fn profile(&self, caller: Caller) -> Result<Account, LedgerError> {
        self.load_account(caller.account_id).await
    }

    /// Public details of the account behind a mobile number.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` for an unknown number.
    pub async fn lookup_recipient(&self, mobile: &str) -> Result<RecipientView, LedgerError> {
        let account = self.load_counterparty(mobile).await?;
        Ok(RecipientView::from(&account))
    }

    /// Changes an account's status. Admin only.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` unless the caller is an active admin, or for the treasury account
    /// - `AccountNotFound`
    /// - `InvalidStatusTransition` for an edge the lifecycle does not allow
    pub async fn set_account_status(
        &self,
        caller: Caller,
        account_id: AccountId,
        status: AccountStatus,
    ) -> Result<Account, LedgerError> {
        self.require_active_admin(caller, "change account status").await?;
        if account_id == self.treasury() {
            return Err(LedgerError::PermissionDenied(
                "the treasury account status cannot be changed".to_string(),
            ));
        }

        let account = self
            .with_retry("set_account_status", || self.apply_status(account_id, status))
            .await?;

        info!(account_id = %account.id, admin = %caller.account_id, status = %account.status, "account status changed");
        Ok(account)
    }

    async fn apply_status(
        &self,
        account_id: AccountId,
        status: AccountStatus,
    ) -> Result<Account, LedgerError> {
        let mut unit = self.store().begin().await?;
        let mut account = unit
            .lock_accounts(&[account_id])
            .await?
            .pop()
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;

        account.status = WorkflowService::change_account_status(account.status, status).map_err(
            |_| LedgerError::InvalidStatusTransition {
                from: account.status,
                to: status,
            },
        )?;
        unit.save_account(&account).await?;
        unit.commit().await?;
        Ok(account)
    }

    /// Lists accounts, oldest first. Admin only.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless the caller is an active admin.
    pub async fn list_accounts(
        &self,
        caller: Caller,
        filter: AccountFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Account>, LedgerError> {
        self.require_active_admin(caller, "list accounts").await?;
        let page = page.normalized();
        let (accounts, total) = self.store().list_accounts(filter, page).await?;
        Ok(PageResponse::new(accounts, page, total))
    }

    /// Agent accounts awaiting approval. Admin only.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless the caller is an active admin.
    pub async fn pending_agents(
        &self,
        caller: Caller,
        page: PageRequest,
    ) -> Result<PageResponse<Account>, LedgerError> {
        let filter = AccountFilter {
            role: Some(Role::Agent),
            status: Some(AccountStatus::Pending),
        };
        self.list_accounts(caller, filter, page).await
    }
}
