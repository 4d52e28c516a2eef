//! Ledger domain types: accounts, transfers, requests and the transaction log.
//!
//! A transaction record is a tagged union over [`LedgerEvent`]. Instant
//! transfers are complete the moment they are written; pending requests carry
//! the only status transition in the log (see [`crate::workflow`]).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use swiftpay_shared::types::{AccountId, TransactionId};

use super::error::LedgerError;
use crate::workflow::RequestStatus;

/// Account role, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End customer holding e-money.
    User,
    /// Cash point that exchanges e-money for physical cash.
    Agent,
    /// Platform operator. The treasury account is an admin.
    Admin,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Self::User),
            "agent" => Some(Self::Agent),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account status. Only `Active` accounts take part in live money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Awaiting admin approval (agents and admins).
    Pending,
    /// May send and receive.
    Active,
    /// Suspended by an admin.
    Blocked,
    /// Registration refused by an admin.
    Rejected,
}

impl AccountStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "blocked" => Some(Self::Blocked),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account holding spendable balance and fee income.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Unique mobile number.
    pub mobile: String,
    /// Unique email, stored lowercase.
    pub email: String,
    /// Unique national ID.
    pub nid: String,
    /// Role, never changes.
    pub role: Role,
    /// Current status.
    pub status: AccountStatus,
    /// Spendable balance, never negative.
    pub balance: Decimal,
    /// Fee income, never negative.
    pub income: Decimal,
    /// Argon2id PHC string of the PIN.
    pub pin_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Returns true if the account may take part in a transfer.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Subtracts from the balance.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` and leaves the account untouched if the
    /// balance would go negative.
    pub fn debit_balance(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Adds to the balance.
    pub fn credit_balance(&mut self, amount: Decimal) {
        self.balance += amount;
    }

    /// Subtracts from income.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientIncome` and leaves the account untouched if
    /// income would go negative.
    pub fn debit_income(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if self.income < amount {
            return Err(LedgerError::InsufficientIncome {
                required: amount,
                available: self.income,
            });
        }
        self.income -= amount;
        Ok(())
    }

    /// Adds to income.
    pub fn credit_income(&mut self, amount: Decimal) {
        self.income += amount;
    }
}

/// Public view of an account, without the PIN hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountView {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Mobile number.
    pub mobile: String,
    /// Email.
    pub email: String,
    /// National ID.
    pub nid: String,
    /// Role.
    pub account_type: Role,
    /// Status.
    pub status: AccountStatus,
    /// Spendable balance.
    pub balance: Decimal,
    /// Fee income.
    pub income: Decimal,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            mobile: account.mobile.clone(),
            email: account.email.clone(),
            nid: account.nid.clone(),
            account_type: account.role,
            status: account.status,
            balance: account.balance,
            income: account.income,
            created_at: account.created_at,
        }
    }
}

/// Counterparty details shown before a transfer is confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientView {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Mobile number.
    pub mobile: String,
    /// Role.
    pub account_type: Role,
    /// Status.
    pub status: AccountStatus,
}

impl From<&Account> for RecipientView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            mobile: account.mobile.clone(),
            account_type: account.role,
            status: account.status,
        }
    }
}

/// Input for registering an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name.
    pub name: String,
    /// Mobile number.
    pub mobile: String,
    /// Email.
    pub email: String,
    /// National ID.
    pub nid: String,
    /// Plaintext PIN, hashed before storage.
    pub pin: String,
    /// Requested role.
    pub role: Role,
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Caller's account.
    pub account_id: AccountId,
    /// Caller's role.
    pub role: Role,
}

impl Caller {
    /// Creates a caller identity.
    #[must_use]
    pub const fn new(account_id: AccountId, role: Role) -> Self {
        Self { account_id, role }
    }
}

/// Transaction type as stored and exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionType {
    /// User to user transfer.
    SendMoney,
    /// Agent pays e-money to a user against cash.
    CashIn,
    /// User redeems e-money for cash at an agent.
    CashOut,
    /// Agent asks for a float top-up.
    BalanceRequest,
    /// Agent asks to withdraw fee income.
    WithdrawalRequest,
}

impl TransactionType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendMoney => "send-money",
            Self::CashIn => "cash-in",
            Self::CashOut => "cash-out",
            Self::BalanceRequest => "balance-request",
            Self::WithdrawalRequest => "withdrawal-request",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "send-money" => Some(Self::SendMoney),
            "cash-in" => Some(Self::CashIn),
            "cash-out" => Some(Self::CashOut),
            "balance-request" => Some(Self::BalanceRequest),
            "withdrawal-request" => Some(Self::WithdrawalRequest),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored transaction status.
///
/// `Failed` exists for storage compatibility. Failing operations persist
/// nothing, so the engine never writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Request awaiting an admin decision.
    Pending,
    /// Applied to balances.
    Completed,
    /// Request refused.
    Rejected,
    /// Never applied.
    Failed,
}

impl TransactionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "rejected" => Some(Self::Rejected),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<RequestStatus> for TransactionStatus {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => Self::Pending,
            RequestStatus::Completed => Self::Completed,
            RequestStatus::Rejected => Self::Rejected,
        }
    }
}

/// Kinds of instant transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferKind {
    /// User to user.
    SendMoney,
    /// Agent to user.
    CashIn,
    /// User to agent.
    CashOut,
}

/// Kinds of two-phase request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestKind {
    /// Float top-up for an agent.
    BalanceRequest,
    /// Payout of an agent's income.
    WithdrawalRequest,
}

impl From<TransferKind> for TransactionType {
    fn from(kind: TransferKind) -> Self {
        match kind {
            TransferKind::SendMoney => Self::SendMoney,
            TransferKind::CashIn => Self::CashIn,
            TransferKind::CashOut => Self::CashOut,
        }
    }
}

impl From<RequestKind> for TransactionType {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::BalanceRequest => Self::BalanceRequest,
            RequestKind::WithdrawalRequest => Self::WithdrawalRequest,
        }
    }
}

/// A completed money movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantTransfer {
    /// Transfer kind.
    pub kind: TransferKind,
    /// Account debited.
    pub sender: AccountId,
    /// Account credited with the principal.
    pub receiver: AccountId,
    /// Principal.
    pub amount: Decimal,
    /// Fee paid by the sender on top of the principal.
    pub fee: Decimal,
}

/// An agent request awaiting an admin decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// Request kind.
    pub kind: RequestKind,
    /// Requesting agent.
    pub agent: AccountId,
    /// Treasury account at submission time.
    pub treasury: AccountId,
    /// Requested amount.
    pub amount: Decimal,
    /// Fee charged on completion. Zero until then.
    pub fee: Decimal,
    /// Current status.
    pub status: RequestStatus,
    /// Admin who resolved the request.
    pub resolved_by: Option<AccountId>,
    /// Resolution time.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl PendingRequest {
    /// Creates a request in `Pending` status.
    #[must_use]
    pub fn new(kind: RequestKind, agent: AccountId, treasury: AccountId, amount: Decimal) -> Self {
        Self {
            kind,
            agent,
            treasury,
            amount,
            fee: Decimal::ZERO,
            status: RequestStatus::Pending,
            resolved_by: None,
            resolved_at: None,
        }
    }

    /// Bookkeeping sender: treasury for balance requests, agent for withdrawals.
    #[must_use]
    pub fn sender(&self) -> AccountId {
        match self.kind {
            RequestKind::BalanceRequest => self.treasury,
            RequestKind::WithdrawalRequest => self.agent,
        }
    }

    /// Bookkeeping receiver: the other party.
    #[must_use]
    pub fn receiver(&self) -> AccountId {
        match self.kind {
            RequestKind::BalanceRequest => self.agent,
            RequestKind::WithdrawalRequest => self.treasury,
        }
    }
}

/// One entry of the append-only ledger log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// Instant transfer, always completed.
    Transfer(InstantTransfer),
    /// Two-phase request.
    Request(PendingRequest),
}

/// A transaction record with its reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Record ID.
    pub id: TransactionId,
    /// Unique human-facing reference.
    pub reference: String,
    /// Optional free text.
    pub note: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// The event itself.
    pub event: LedgerEvent,
}

impl TransactionRecord {
    /// Creates a record for an event.
    #[must_use]
    pub fn new(reference: String, note: Option<String>, event: LedgerEvent) -> Self {
        Self {
            id: TransactionId::new(),
            reference,
            note,
            created_at: Utc::now(),
            event,
        }
    }

    /// Returns the stored transaction type.
    #[must_use]
    pub fn transaction_type(&self) -> TransactionType {
        match &self.event {
            LedgerEvent::Transfer(t) => t.kind.into(),
            LedgerEvent::Request(r) => r.kind.into(),
        }
    }

    /// Returns the stored status.
    #[must_use]
    pub fn status(&self) -> TransactionStatus {
        match &self.event {
            LedgerEvent::Transfer(_) => TransactionStatus::Completed,
            LedgerEvent::Request(r) => r.status.into(),
        }
    }

    /// Returns the sender column.
    #[must_use]
    pub fn sender(&self) -> AccountId {
        match &self.event {
            LedgerEvent::Transfer(t) => t.sender,
            LedgerEvent::Request(r) => r.sender(),
        }
    }

    /// Returns the receiver column.
    #[must_use]
    pub fn receiver(&self) -> AccountId {
        match &self.event {
            LedgerEvent::Transfer(t) => t.receiver,
            LedgerEvent::Request(r) => r.receiver(),
        }
    }

    /// Returns the principal.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        match &self.event {
            LedgerEvent::Transfer(t) => t.amount,
            LedgerEvent::Request(r) => r.amount,
        }
    }

    /// Returns the fee.
    #[must_use]
    pub fn fee(&self) -> Decimal {
        match &self.event {
            LedgerEvent::Transfer(t) => t.fee,
            LedgerEvent::Request(r) => r.fee,
        }
    }

    /// Returns true if the account is the sender or the receiver.
    #[must_use]
    pub fn involves(&self, account: AccountId) -> bool {
        self.sender() == account || self.receiver() == account
    }

    /// Returns the request if this record is one.
    #[must_use]
    pub fn as_request(&self) -> Option<&PendingRequest> {
        match &self.event {
            LedgerEvent::Request(r) => Some(r),
            LedgerEvent::Transfer(_) => None,
        }
    }
}

/// Flat, serializable view of a transaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionView {
    /// Record ID.
    pub id: TransactionId,
    /// Reference.
    pub reference: String,
    /// Type.
    pub transaction_type: TransactionType,
    /// Principal.
    pub amount: Decimal,
    /// Fee.
    pub fee: Decimal,
    /// Sender column.
    pub sender: AccountId,
    /// Receiver column.
    pub receiver: AccountId,
    /// Status.
    pub status: TransactionStatus,
    /// Note.
    pub note: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Resolution time for requests.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<&TransactionRecord> for TransactionView {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            id: record.id,
            reference: record.reference.clone(),
            transaction_type: record.transaction_type(),
            amount: record.amount(),
            fee: record.fee(),
            sender: record.sender(),
            receiver: record.receiver(),
            status: record.status(),
            note: record.note.clone(),
            created_at: record.created_at,
            resolved_at: record.as_request().and_then(|r| r.resolved_at),
        }
    }
}
