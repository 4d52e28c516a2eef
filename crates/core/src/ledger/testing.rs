//! Shared fixtures for engine tests.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use swiftpay_shared::LedgerConfig;
use swiftpay_shared::types::AccountId;

use super::engine::LedgerEngine;
use super::memory::MemoryLedgerStore;
use super::store::LedgerStore;
use super::types::{Account, AccountStatus, Caller, Role};
use crate::auth::{PinError, SecretVerifier};

pub(crate) const PIN: &str = "12345";
pub(crate) const WRONG_PIN: &str = "54321";

/// Stores PINs as `plain:<pin>` so tests skip Argon2.
pub(crate) struct PlainVerifier;

impl SecretVerifier for PlainVerifier {
    fn hash(&self, pin: &str) -> Result<String, PinError> {
        Ok(format!("plain:{pin}"))
    }

    fn verify(&self, pin: &str, hash: &str) -> bool {
        hash.strip_prefix("plain:") == Some(pin)
    }
}

pub(crate) struct Fixture {
    pub store: MemoryLedgerStore,
    pub engine: Arc<LedgerEngine>,
    pub treasury: Account,
    pub alice: Account,
    pub bob: Account,
    pub agent: Account,
}

impl Fixture {
    /// Treasury (income 0), alice (200), bob (0), agent (float 100000, income 1500).
    pub async fn new() -> Self {
        Self::with_config(LedgerConfig::default()).await
    }

    pub async fn with_config(config: LedgerConfig) -> Self {
        let store = MemoryLedgerStore::new();
        let treasury = add_account(&store, Role::Admin, "01700000000", Decimal::ZERO, Decimal::ZERO).await;
        let alice = add_account(&store, Role::User, "01711111111", Decimal::from(200), Decimal::ZERO).await;
        let bob = add_account(&store, Role::User, "01722222222", Decimal::ZERO, Decimal::ZERO).await;
        let agent = add_account(
            &store,
            Role::Agent,
            "01733333333",
            Decimal::from(100_000),
            Decimal::from(1500),
        )
        .await;

        let engine = LedgerEngine::new(
            Arc::new(store.clone()),
            Arc::new(PlainVerifier),
            treasury.id,
            config,
        );

        Self {
            store,
            engine: Arc::new(engine),
            treasury,
            alice,
            bob,
            agent,
        }
    }

    pub async fn add(&self, role: Role, mobile: &str, balance: Decimal, income: Decimal) -> Account {
        add_account(&self.store, role, mobile, balance, income).await
    }

    pub async fn account(&self, id: AccountId) -> Account {
        self.store.find_account(id).await.unwrap().unwrap()
    }

    pub async fn set_status(&self, id: AccountId, status: AccountStatus) {
        let mut unit = self.store.begin().await.unwrap();
        let mut account = unit.lock_accounts(&[id]).await.unwrap().remove(0);
        account.status = status;
        unit.save_account(&account).await.unwrap();
        unit.commit().await.unwrap();
    }

    /// Sum of every balance plus every income.
    pub async fn total_value(&self) -> Decimal {
        self.store
            .accounts()
            .await
            .iter()
            .map(|a| a.balance + a.income)
            .sum()
    }
}

pub(crate) fn caller(account: &Account) -> Caller {
    Caller::new(account.id, account.role)
}

async fn add_account(
    store: &MemoryLedgerStore,
    role: Role,
    mobile: &str,
    balance: Decimal,
    income: Decimal,
) -> Account {
    let account = Account {
        id: AccountId::new(),
        name: format!("{role} {mobile}"),
        mobile: mobile.to_string(),
        email: format!("{mobile}@swiftpay.test"),
        nid: format!("NID{mobile}"),
        role,
        status: AccountStatus::Active,
        balance,
        income,
        pin_hash: format!("plain:{PIN}"),
        created_at: Utc::now(),
    };
    store.insert_account(&account).await.unwrap();
    account
}
