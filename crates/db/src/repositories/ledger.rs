//! Postgres implementation of the ledger store.
//!
//! Every engine mutation runs inside one database transaction. Account and
//! request rows are locked with `SELECT ... FOR UPDATE`, always in ascending
//! ID order, so concurrent transfers over the same accounts serialize on the
//! row locks instead of deadlocking.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RuntimeErr, Select, Set, SqlErr, Statement, TransactionTrait, Unchanged,
};
use swiftpay_core::ledger::{
    Account, AccountFilter, AccountStatus, AccountTotals, InstantTransfer, LedgerError,
    LedgerEvent, LedgerStore, LedgerUnit, PendingRequest, RequestKind, Role, TransactionFilter,
    TransactionRecord, TransactionStatus, TransactionType, TransferKind, lock_order,
};
use swiftpay_core::workflow::RequestStatus;
use swiftpay_shared::types::{AccountId, PageRequest, TransactionId};
use tracing::{error, warn};

use crate::entities::{accounts, sea_orm_active_enums as db_enums, transactions};

/// SQLSTATE codes that mean "retry the whole unit".
const RETRYABLE_SQLSTATES: [&str; 2] = ["40001", "40P01"];

const ACCOUNT_TOTALS_SQL: &str = r"
SELECT
    COALESCE(SUM(balance), 0) AS total_balance,
    COALESCE(SUM(income), 0) AS total_income,
    COUNT(*) FILTER (WHERE role = 'user') AS users,
    COUNT(*) FILTER (WHERE role = 'agent') AS agents,
    COUNT(*) FILTER (WHERE role = 'admin') AS admins,
    COUNT(*) FILTER (WHERE status = 'pending') AS pending,
    COUNT(*) FILTER (WHERE status = 'blocked') AS blocked
FROM accounts
";

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    total_balance: rust_decimal::Decimal,
    total_income: rust_decimal::Decimal,
    users: i64,
    agents: i64,
    admins: i64,
    pending: i64,
    blocked: i64,
}

/// Ledger store backed by Postgres.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl LedgerStore for LedgerRepository {
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        Ok(Box::new(PgLedgerUnit { txn }))
    }

    async fn insert_account(&self, account: &Account) -> Result<(), LedgerError> {
        let now = Utc::now().into();
        let model = accounts::ActiveModel {
            id: Set(account.id.into_inner()),
            name: Set(account.name.clone()),
            mobile: Set(account.mobile.clone()),
            email: Set(account.email.clone()),
            nid: Set(account.nid.clone()),
            role: Set(role_to_db(account.role)),
            status: Set(status_to_db(account.status)),
            balance: Set(account.balance),
            income: Set(account.income),
            pin_hash: Set(account.pin_hash.clone()),
            created_at: Set(account.created_at.into()),
            updated_at: Set(now),
        };
        model.insert(&self.db).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        let model = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(account_from_model))
    }

    async fn find_account_by_mobile(&self, mobile: &str) -> Result<Option<Account>, LedgerError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Mobile.eq(mobile))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(account_from_model))
    }

    async fn find_account_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, LedgerError> {
        let model = accounts::Entity::find()
            .filter(
                Condition::any()
                    .add(accounts::Column::Mobile.eq(identifier))
                    .add(accounts::Column::Email.eq(identifier.to_lowercase())),
            )
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(account_from_model))
    }

    async fn list_accounts(
        &self,
        filter: AccountFilter,
        page: PageRequest,
    ) -> Result<(Vec<Account>, u64), LedgerError> {
        let mut query = accounts::Entity::find();
        if let Some(role) = filter.role {
            query = query.filter(accounts::Column::Role.eq(role_to_db(role)));
        }
        if let Some(status) = filter.status {
            query = query.filter(accounts::Column::Status.eq(status_to_db(status)));
        }

        let total = query.clone().count(&self.db).await.map_err(map_db_err)?;
        let models = query
            .order_by_asc(accounts::Column::CreatedAt)
            .order_by_asc(accounts::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok((models.into_iter().map(account_from_model).collect(), total))
    }

    async fn account_totals(&self) -> Result<AccountTotals, LedgerError> {
        let row = TotalsRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            ACCOUNT_TOTALS_SQL,
        ))
        .one(&self.db)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| LedgerError::Internal("account totals query returned no row".to_string()))?;

        let count = |n: i64| u64::try_from(n).unwrap_or_default();
        Ok(AccountTotals {
            total_balance: row.total_balance,
            total_income: row.total_income,
            users: count(row.users),
            agents: count(row.agents),
            admins: count(row.admins),
            pending: count(row.pending),
            blocked: count(row.blocked),
        })
    }

    async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(record_from_model)
            .transpose()
    }

    async fn list_transactions(
        &self,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<(Vec<TransactionRecord>, u64), LedgerError> {
        let query = filtered_transactions(filter);
        let total = query.clone().count(&self.db).await.map_err(map_db_err)?;
        let models = query
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let records = models
            .into_iter()
            .map(record_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, total))
    }

    async fn count_transactions(&self, filter: TransactionFilter) -> Result<u64, LedgerError> {
        filtered_transactions(filter)
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}

/// One database transaction. Dropping it without commit rolls back.
pub struct PgLedgerUnit {
    txn: DatabaseTransaction,
}

#[async_trait]
impl LedgerUnit for PgLedgerUnit {
    async fn lock_accounts(&mut self, ids: &[AccountId]) -> Result<Vec<Account>, LedgerError> {
        let mut locked = HashMap::new();
        for id in lock_order(ids) {
            let model = accounts::Entity::find_by_id(id.into_inner())
                .lock_exclusive()
                .one(&self.txn)
                .await
                .map_err(map_db_err)?
                .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?;
            locked.insert(id, account_from_model(model));
        }

        ids.iter()
            .map(|id| {
                locked
                    .get(id)
                    .cloned()
                    .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))
            })
            .collect()
    }

    async fn lock_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        transactions::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(map_db_err)?
            .map(record_from_model)
            .transpose()
    }

    async fn save_account(&mut self, account: &Account) -> Result<(), LedgerError> {
        let model = accounts::ActiveModel {
            id: Unchanged(account.id.into_inner()),
            status: Set(status_to_db(account.status)),
            balance: Set(account.balance),
            income: Set(account.income),
            ..Default::default()
        };
        model.update(&self.txn).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn insert_transaction(&mut self, record: &TransactionRecord) -> Result<(), LedgerError> {
        let (resolved_by, resolved_at) = record
            .as_request()
            .map_or((None, None), |r| (r.resolved_by, r.resolved_at));

        let model = transactions::ActiveModel {
            id: Set(record.id.into_inner()),
            reference: Set(record.reference.clone()),
            transaction_type: Set(type_to_db(record.transaction_type())),
            status: Set(transaction_status_to_db(record.status())),
            sender_id: Set(record.sender().into_inner()),
            receiver_id: Set(record.receiver().into_inner()),
            amount: Set(record.amount()),
            fee: Set(record.fee()),
            note: Set(record.note.clone()),
            resolved_by: Set(resolved_by.map(AccountId::into_inner)),
            resolved_at: Set(resolved_at.map(Into::into)),
            created_at: Set(record.created_at.into()),
        };
        model.insert(&self.txn).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn update_request(
        &mut self,
        id: TransactionId,
        request: &PendingRequest,
    ) -> Result<(), LedgerError> {
        let model = transactions::ActiveModel {
            id: Unchanged(id.into_inner()),
            status: Set(transaction_status_to_db(request.status.into())),
            fee: Set(request.fee),
            resolved_by: Set(request.resolved_by.map(AccountId::into_inner)),
            resolved_at: Set(request.resolved_at.map(Into::into)),
            ..Default::default()
        };
        model.update(&self.txn).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        self.txn.commit().await.map_err(map_db_err)
    }
}

fn filtered_transactions(filter: TransactionFilter) -> Select<transactions::Entity> {
    let mut query = transactions::Entity::find();
    if let Some(account) = filter.account {
        let id = account.into_inner();
        query = query.filter(
            Condition::any()
                .add(transactions::Column::SenderId.eq(id))
                .add(transactions::Column::ReceiverId.eq(id)),
        );
    }
    if let Some(transaction_type) = filter.transaction_type {
        query = query.filter(transactions::Column::TransactionType.eq(type_to_db(transaction_type)));
    }
    if let Some(status) = filter.status {
        query = query.filter(transactions::Column::Status.eq(transaction_status_to_db(status)));
    }
    query
}

// ============================================================
// ERROR MAPPING
// ============================================================

/// Translates a database error into the ledger taxonomy.
///
/// Unique violations name the constraint; deadlocks and serialization
/// failures become `ConcurrentModification` so the engine retries.
pub(crate) fn map_db_err(err: DbErr) -> LedgerError {
    if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
        return unique_violation(&message);
    }

    if let Some(code) = sqlstate(&err)
        && RETRYABLE_SQLSTATES.contains(&code.as_str())
    {
        warn!(sqlstate = %code, "Lock conflict, unit will be retried");
        return LedgerError::ConcurrentModification;
    }

    error!(error = %err, "Database operation failed");
    LedgerError::Storage(err.to_string())
}

fn unique_violation(message: &str) -> LedgerError {
    if message.contains("transactions_reference_key") {
        return LedgerError::DuplicateReference;
    }
    for field in ["mobile", "email", "nid"] {
        if message.contains(&format!("accounts_{field}_key")) {
            return LedgerError::DuplicateAccount(field.to_string());
        }
    }
    LedgerError::Storage(message.to_string())
}

fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db_err))) => {
            db_err.code().map(std::borrow::Cow::into_owned)
        }
        _ => None,
    }
}

// ============================================================
// MODEL CONVERSION
// ============================================================

fn account_from_model(model: accounts::Model) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        name: model.name,
        mobile: model.mobile,
        email: model.email,
        nid: model.nid,
        role: role_from_db(model.role),
        status: status_from_db(model.status),
        balance: model.balance,
        income: model.income,
        pin_hash: model.pin_hash,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn record_from_model(model: transactions::Model) -> Result<TransactionRecord, LedgerError> {
    let sender = AccountId::from_uuid(model.sender_id);
    let receiver = AccountId::from_uuid(model.receiver_id);

    let transfer = |kind| {
        if model.status == db_enums::TransactionStatus::Completed {
            Ok(LedgerEvent::Transfer(InstantTransfer {
                kind,
                sender,
                receiver,
                amount: model.amount,
                fee: model.fee,
            }))
        } else {
            Err(corrupt_row(&model.reference, "instant transfer is not completed"))
        }
    };

    let event = match model.transaction_type {
        db_enums::TransactionType::SendMoney => transfer(TransferKind::SendMoney)?,
        db_enums::TransactionType::CashIn => transfer(TransferKind::CashIn)?,
        db_enums::TransactionType::CashOut => transfer(TransferKind::CashOut)?,
        db_enums::TransactionType::BalanceRequest | db_enums::TransactionType::WithdrawalRequest => {
            let (kind, agent, treasury) =
                if model.transaction_type == db_enums::TransactionType::BalanceRequest {
                    (RequestKind::BalanceRequest, receiver, sender)
                } else {
                    (RequestKind::WithdrawalRequest, sender, receiver)
                };
            let status = match model.status {
                db_enums::TransactionStatus::Pending => RequestStatus::Pending,
                db_enums::TransactionStatus::Completed => RequestStatus::Completed,
                db_enums::TransactionStatus::Rejected => RequestStatus::Rejected,
                db_enums::TransactionStatus::Failed => {
                    return Err(corrupt_row(&model.reference, "request marked failed"));
                }
            };
            LedgerEvent::Request(PendingRequest {
                kind,
                agent,
                treasury,
                amount: model.amount,
                fee: model.fee,
                status,
                resolved_by: model.resolved_by.map(AccountId::from_uuid),
                resolved_at: model.resolved_at.map(|at| at.with_timezone(&Utc)),
            })
        }
    };

    Ok(TransactionRecord {
        id: TransactionId::from_uuid(model.id),
        reference: model.reference,
        note: model.note,
        created_at: model.created_at.with_timezone(&Utc),
        event,
    })
}

fn corrupt_row(reference: &str, detail: &str) -> LedgerError {
    error!(reference, detail, "Inconsistent transaction row");
    LedgerError::Internal(format!("transaction {reference}: {detail}"))
}

const fn role_to_db(role: Role) -> db_enums::AccountRole {
    match role {
        Role::User => db_enums::AccountRole::User,
        Role::Agent => db_enums::AccountRole::Agent,
        Role::Admin => db_enums::AccountRole::Admin,
    }
}

const fn role_from_db(role: db_enums::AccountRole) -> Role {
    match role {
        db_enums::AccountRole::User => Role::User,
        db_enums::AccountRole::Agent => Role::Agent,
        db_enums::AccountRole::Admin => Role::Admin,
    }
}

const fn status_to_db(status: AccountStatus) -> db_enums::AccountStatus {
    match status {
        AccountStatus::Pending => db_enums::AccountStatus::Pending,
        AccountStatus::Active => db_enums::AccountStatus::Active,
        AccountStatus::Blocked => db_enums::AccountStatus::Blocked,
        AccountStatus::Rejected => db_enums::AccountStatus::Rejected,
    }
}

const fn status_from_db(status: db_enums::AccountStatus) -> AccountStatus {
    match status {
        db_enums::AccountStatus::Pending => AccountStatus::Pending,
        db_enums::AccountStatus::Active => AccountStatus::Active,
        db_enums::AccountStatus::Blocked => AccountStatus::Blocked,
        db_enums::AccountStatus::Rejected => AccountStatus::Rejected,
    }
}

const fn type_to_db(transaction_type: TransactionType) -> db_enums::TransactionType {
    match transaction_type {
        TransactionType::SendMoney => db_enums::TransactionType::SendMoney,
        TransactionType::CashIn => db_enums::TransactionType::CashIn,
        TransactionType::CashOut => db_enums::TransactionType::CashOut,
        TransactionType::BalanceRequest => db_enums::TransactionType::BalanceRequest,
        TransactionType::WithdrawalRequest => db_enums::TransactionType::WithdrawalRequest,
    }
}

const fn transaction_status_to_db(status: TransactionStatus) -> db_enums::TransactionStatus {
    match status {
        TransactionStatus::Pending => db_enums::TransactionStatus::Pending,
        TransactionStatus::Completed => db_enums::TransactionStatus::Completed,
        TransactionStatus::Rejected => db_enums::TransactionStatus::Rejected,
        TransactionStatus::Failed => db_enums::TransactionStatus::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_names_the_field() {
        let err = unique_violation(
            r#"duplicate key value violates unique constraint "accounts_email_key""#,
        );
        assert!(matches!(err, LedgerError::DuplicateAccount(f) if f == "email"));

        let err = unique_violation(
            r#"duplicate key value violates unique constraint "transactions_reference_key""#,
        );
        assert!(matches!(err, LedgerError::DuplicateReference));

        let err = unique_violation("something else");
        assert!(matches!(err, LedgerError::Storage(_)));
    }

    #[test]
    fn test_request_columns_map_back_to_parties() {
        let agent = uuid::Uuid::new_v4();
        let treasury = uuid::Uuid::new_v4();
        let now = Utc::now().into();
        let model = transactions::Model {
            id: uuid::Uuid::new_v4(),
            reference: "TRX-20260301-ABCDEFGHJK".to_string(),
            transaction_type: db_enums::TransactionType::BalanceRequest,
            status: db_enums::TransactionStatus::Pending,
            sender_id: treasury,
            receiver_id: agent,
            amount: rust_decimal::Decimal::from(100),
            fee: rust_decimal::Decimal::ZERO,
            note: None,
            resolved_by: None,
            resolved_at: None,
            created_at: now,
        };

        let record = record_from_model(model.clone()).unwrap();
        let request = record.as_request().unwrap();
        assert_eq!(request.agent.into_inner(), agent);
        assert_eq!(request.treasury.into_inner(), treasury);
        assert_eq!(request.status, RequestStatus::Pending);

        let failed = transactions::Model {
            status: db_enums::TransactionStatus::Failed,
            ..model.clone()
        };
        assert!(matches!(record_from_model(failed), Err(LedgerError::Internal(_))));

        let pending_transfer = transactions::Model {
            transaction_type: db_enums::TransactionType::SendMoney,
            ..model
        };
        assert!(record_from_model(pending_transfer).is_err());
    }
}
