//! Ledger schema.
//!
//! Creates the enums, the accounts and transactions tables, their
//! constraints and indexes, and the append-only guard on transactions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TABLES
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 3: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_role AS ENUM ('user', 'agent', 'admin');

CREATE TYPE account_status AS ENUM ('pending', 'active', 'blocked', 'rejected');

CREATE TYPE transaction_type AS ENUM (
    'send-money',
    'cash-in',
    'cash-out',
    'balance-request',
    'withdrawal-request'
);

CREATE TYPE transaction_status AS ENUM ('pending', 'completed', 'rejected', 'failed');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id          UUID PRIMARY KEY,
    name        VARCHAR(255) NOT NULL,
    mobile      VARCHAR(32) NOT NULL,
    email       VARCHAR(255) NOT NULL,
    nid         VARCHAR(64) NOT NULL,
    role        account_role NOT NULL,
    status      account_status NOT NULL,
    balance     NUMERIC(19, 4) NOT NULL DEFAULT 0,
    income      NUMERIC(19, 4) NOT NULL DEFAULT 0,
    pin_hash    TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT accounts_mobile_key UNIQUE (mobile),
    CONSTRAINT accounts_email_key UNIQUE (email),
    CONSTRAINT accounts_nid_key UNIQUE (nid),
    CONSTRAINT chk_accounts_balance_non_negative CHECK (balance >= 0),
    CONSTRAINT chk_accounts_income_non_negative CHECK (income >= 0),
    CONSTRAINT chk_accounts_email_lowercase CHECK (email = LOWER(email))
);

CREATE INDEX idx_accounts_role_status ON accounts(role, status);
CREATE INDEX idx_accounts_created_at ON accounts(created_at);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id                UUID PRIMARY KEY,
    reference         VARCHAR(32) NOT NULL,
    transaction_type  transaction_type NOT NULL,
    status            transaction_status NOT NULL,
    sender_id         UUID NOT NULL REFERENCES accounts(id),
    receiver_id       UUID NOT NULL REFERENCES accounts(id),
    amount            NUMERIC(19, 4) NOT NULL,
    fee               NUMERIC(19, 4) NOT NULL DEFAULT 0,
    note              TEXT,
    resolved_by       UUID REFERENCES accounts(id),
    resolved_at       TIMESTAMPTZ,
    created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT transactions_reference_key UNIQUE (reference),
    CONSTRAINT chk_transactions_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_transactions_fee_non_negative CHECK (fee >= 0),
    CONSTRAINT chk_transactions_distinct_parties CHECK (sender_id <> receiver_id),
    CONSTRAINT chk_transactions_instant_completed CHECK (
        transaction_type IN ('balance-request', 'withdrawal-request')
        OR status = 'completed'
    ),
    CONSTRAINT chk_transactions_resolution CHECK (
        (status = 'pending') = (resolved_at IS NULL)
        OR transaction_type NOT IN ('balance-request', 'withdrawal-request')
    )
);

CREATE INDEX idx_transactions_sender ON transactions(sender_id, created_at DESC);
CREATE INDEX idx_transactions_receiver ON transactions(receiver_id, created_at DESC);
CREATE INDEX idx_transactions_type_status ON transactions(transaction_type, status);
CREATE INDEX idx_transactions_created_at ON transactions(created_at DESC);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: guard_transaction_log
-- Rows are never deleted. Only a pending request may change, and only
-- its status, fee and resolution columns.
-- ============================================================
CREATE OR REPLACE FUNCTION guard_transaction_log()
RETURNS TRIGGER AS $$
BEGIN
    IF TG_OP = 'DELETE' THEN
        RAISE EXCEPTION 'Transactions are append-only';
    END IF;

    IF OLD.status <> 'pending' THEN
        RAISE EXCEPTION 'Cannot modify % transaction %', OLD.status, OLD.reference;
    END IF;

    IF NEW.id <> OLD.id
        OR NEW.reference <> OLD.reference
        OR NEW.transaction_type <> OLD.transaction_type
        OR NEW.sender_id <> OLD.sender_id
        OR NEW.receiver_id <> OLD.receiver_id
        OR NEW.amount <> OLD.amount
        OR NEW.note IS DISTINCT FROM OLD.note
        OR NEW.created_at <> OLD.created_at
    THEN
        RAISE EXCEPTION 'Only status, fee and resolution of a request can change';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_guard_transaction_update
BEFORE UPDATE ON transactions
FOR EACH ROW
EXECUTE FUNCTION guard_transaction_log();

CREATE TRIGGER trg_guard_transaction_delete
BEFORE DELETE ON transactions
FOR EACH ROW
EXECUTE FUNCTION guard_transaction_log();

-- ============================================================
-- FUNCTION: touch_updated_at
-- ============================================================
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at := NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_accounts_updated_at
BEFORE UPDATE ON accounts
FOR EACH ROW
EXECUTE FUNCTION touch_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS accounts;
DROP FUNCTION IF EXISTS guard_transaction_log();
DROP FUNCTION IF EXISTS touch_updated_at();
DROP TYPE IF EXISTS transaction_status;
DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS account_status;
DROP TYPE IF EXISTS account_role;
";
