//! Engine tests over the in-memory store: transfers, account lifecycle, queries.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use swiftpay_shared::LedgerConfig;
use swiftpay_shared::types::{AccountId, PageRequest};

use super::engine::LedgerEngine;
use super::error::LedgerError;
use super::memory::{FailPoint, MemoryLedgerStore};
use super::reference::is_valid_reference;
use super::store::{AccountFilter, LedgerStore};
use super::testing::{Fixture, PIN, PlainVerifier, WRONG_PIN, caller};
use super::types::{
    AccountStatus, Caller, NewAccount, Role, TransactionStatus, TransactionType,
};

// ========== send-money ==========

#[tokio::test]
async fn test_send_money_moves_amount_and_fee() {
    let fx = Fixture::new().await;

    let record = fx
        .engine
        .send_money(caller(&fx.alice), &fx.bob.mobile, dec!(150), PIN)
        .await
        .unwrap();

    assert_eq!(fx.account(fx.alice.id).await.balance, dec!(45));
    assert_eq!(fx.account(fx.bob.id).await.balance, dec!(150));
    assert_eq!(fx.account(fx.treasury.id).await.income, dec!(5));

    assert_eq!(record.transaction_type(), TransactionType::SendMoney);
    assert_eq!(record.status(), TransactionStatus::Completed);
    assert_eq!(record.sender(), fx.alice.id);
    assert_eq!(record.receiver(), fx.bob.id);
    assert_eq!(record.amount(), dec!(150));
    assert_eq!(record.fee(), dec!(5));
    assert!(is_valid_reference(&record.reference));
    assert_eq!(fx.store.transactions().await, vec![record]);
}

#[tokio::test]
async fn test_send_money_below_fee_threshold_is_free() {
    let fx = Fixture::new().await;

    let record = fx
        .engine
        .send_money(caller(&fx.alice), &fx.bob.mobile, dec!(99.99), PIN)
        .await
        .unwrap();

    assert_eq!(record.fee(), Decimal::ZERO);
    assert_eq!(fx.account(fx.alice.id).await.balance, dec!(100.01));
    assert_eq!(fx.account(fx.treasury.id).await.income, Decimal::ZERO);
}

#[tokio::test]
async fn test_send_money_insufficient_funds_changes_nothing() {
    let fx = Fixture::new().await;
    let carol = fx.add(Role::User, "01744444444", dec!(40), Decimal::ZERO).await;

    let err = fx
        .engine
        .send_money(caller(&carol), &fx.bob.mobile, dec!(60), PIN)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::InsufficientFunds { required, available }
            if required == dec!(60) && available == dec!(40)
    ));
    assert_eq!(fx.account(carol.id).await.balance, dec!(40));
    assert_eq!(fx.account(fx.bob.id).await.balance, Decimal::ZERO);
    assert!(fx.store.transactions().await.is_empty());
}

#[tokio::test]
async fn test_send_money_counts_fee_in_funds_check() {
    let fx = Fixture::new().await;

    // 196 + 5 > 200
    let err = fx
        .engine
        .send_money(caller(&fx.alice), &fx.bob.mobile, dec!(196), PIN)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));

    fx.engine
        .send_money(caller(&fx.alice), &fx.bob.mobile, dec!(195), PIN)
        .await
        .unwrap();
    assert_eq!(fx.account(fx.alice.id).await.balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_send_money_to_agent_reports_role_before_pin() {
    let fx = Fixture::new().await;

    let err = fx
        .engine
        .send_money(caller(&fx.alice), &fx.agent.mobile, dec!(100), WRONG_PIN)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::RoleNotAllowed {
            expected: Role::User,
            actual: Role::Agent
        }
    ));
    assert!(fx.store.transactions().await.is_empty());
}

#[tokio::test]
async fn test_send_money_rejects_wrong_pin() {
    let fx = Fixture::new().await;

    let err = fx
        .engine
        .send_money(caller(&fx.alice), &fx.bob.mobile, dec!(100), WRONG_PIN)
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InvalidSecret));
    assert_eq!(fx.account(fx.alice.id).await.balance, dec!(200));
}

#[tokio::test]
async fn test_send_money_validation() {
    let fx = Fixture::new().await;
    let alice = caller(&fx.alice);

    let err = fx.engine.send_money(alice, &fx.bob.mobile, dec!(49.99), PIN).await;
    assert!(matches!(err, Err(LedgerError::InvalidAmount(_))));

    let err = fx.engine.send_money(alice, &fx.bob.mobile, dec!(50.001), PIN).await;
    assert!(matches!(err, Err(LedgerError::InvalidAmount(_))));

    let err = fx.engine.send_money(alice, &fx.alice.mobile, dec!(50), PIN).await;
    assert!(matches!(err, Err(LedgerError::SelfTransferNotAllowed)));

    let err = fx.engine.send_money(alice, "01799999999", dec!(50), PIN).await;
    assert!(matches!(err, Err(LedgerError::AccountNotFound(_))));

    let err = fx
        .engine
        .send_money(caller(&fx.agent), &fx.bob.mobile, dec!(50), PIN)
        .await;
    assert!(matches!(err, Err(LedgerError::PermissionDenied(_))));
}

#[tokio::test]
async fn test_send_money_to_blocked_user_fails() {
    let fx = Fixture::new().await;
    fx.set_status(fx.bob.id, AccountStatus::Blocked).await;

    let err = fx
        .engine
        .send_money(caller(&fx.alice), &fx.bob.mobile, dec!(100), PIN)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::AccountInactive {
            status: AccountStatus::Blocked,
            ..
        }
    ));
}

// ========== cash-out ==========

#[tokio::test]
async fn test_cash_out_splits_fee() {
    let fx = Fixture::new().await;

    let record = fx
        .engine
        .cash_out(caller(&fx.alice), &fx.agent.mobile, dec!(100), PIN)
        .await
        .unwrap();

    assert_eq!(record.fee(), dec!(1.5));
    assert_eq!(fx.account(fx.alice.id).await.balance, dec!(98.5));
    let agent = fx.account(fx.agent.id).await;
    assert_eq!(agent.balance, dec!(99900));
    assert_eq!(agent.income, dec!(1501));
    assert_eq!(fx.account(fx.treasury.id).await.income, dec!(0.5));
    assert_eq!(record.sender(), fx.alice.id);
    assert_eq!(record.receiver(), fx.agent.id);
}

#[tokio::test]
async fn test_cash_out_rounds_each_share() {
    let fx = Fixture::new().await;

    let record = fx
        .engine
        .cash_out(caller(&fx.alice), &fx.agent.mobile, dec!(33.33), PIN)
        .await
        .unwrap();

    // treasury share 0.16665 rounds half-even to 0.1666
    assert_eq!(record.fee(), dec!(0.4999));
    assert_eq!(
        fx.account(fx.alice.id).await.balance,
        dec!(200) - dec!(33.33) - dec!(0.4999)
    );
}

#[tokio::test]
async fn test_cash_out_checks_agent_float() {
    let fx = Fixture::new().await;
    let poor_agent = fx.add(Role::Agent, "01755555555", dec!(10), Decimal::ZERO).await;

    let err = fx
        .engine
        .cash_out(caller(&fx.alice), &poor_agent.mobile, dec!(50), PIN)
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(fx.account(fx.alice.id).await.balance, dec!(200));
}

#[tokio::test]
async fn test_cash_out_requires_active_user_and_agent_target() {
    let fx = Fixture::new().await;

    let err = fx
        .engine
        .cash_out(caller(&fx.alice), &fx.bob.mobile, dec!(50), PIN)
        .await;
    assert!(matches!(err, Err(LedgerError::RoleNotAllowed { .. })));

    fx.set_status(fx.alice.id, AccountStatus::Blocked).await;
    let err = fx
        .engine
        .cash_out(caller(&fx.alice), &fx.agent.mobile, dec!(50), PIN)
        .await;
    assert!(matches!(err, Err(LedgerError::AccountInactive { .. })));
}

// ========== cash-in ==========

#[tokio::test]
async fn test_cash_in_moves_float_to_user() {
    let fx = Fixture::new().await;

    let record = fx
        .engine
        .cash_in(caller(&fx.agent), &fx.bob.mobile, dec!(500), PIN)
        .await
        .unwrap();

    assert_eq!(record.fee(), Decimal::ZERO);
    assert_eq!(record.sender(), fx.agent.id);
    assert_eq!(record.receiver(), fx.bob.id);
    assert_eq!(fx.account(fx.bob.id).await.balance, dec!(500));
    assert_eq!(fx.account(fx.agent.id).await.balance, dec!(99500));
}

#[tokio::test]
async fn test_cash_in_rules() {
    let fx = Fixture::new().await;

    let err = fx
        .engine
        .cash_in(caller(&fx.agent), &fx.bob.mobile, dec!(100000.01), PIN)
        .await;
    assert!(matches!(err, Err(LedgerError::InsufficientFunds { .. })));

    let err = fx
        .engine
        .cash_in(caller(&fx.alice), &fx.bob.mobile, dec!(10), PIN)
        .await;
    assert!(matches!(err, Err(LedgerError::PermissionDenied(_))));

    let err = fx
        .engine
        .cash_in(caller(&fx.agent), &fx.bob.mobile, Decimal::ZERO, PIN)
        .await;
    assert!(matches!(err, Err(LedgerError::InvalidAmount(_))));

    fx.set_status(fx.agent.id, AccountStatus::Pending).await;
    let err = fx
        .engine
        .cash_in(caller(&fx.agent), &fx.bob.mobile, dec!(10), PIN)
        .await;
    assert!(matches!(err, Err(LedgerError::AccountInactive { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cash_ins_conserve_float() {
    let fx = Fixture::new().await;

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let engine = Arc::clone(&fx.engine);
            let agent = caller(&fx.agent);
            let mobile = fx.bob.mobile.clone();
            tokio::spawn(async move { engine.cash_in(agent, &mobile, dec!(100), PIN).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(fx.account(fx.bob.id).await.balance, dec!(10000));
    assert_eq!(fx.account(fx.agent.id).await.balance, dec!(90000));
    assert_eq!(fx.store.transactions().await.len(), 100);
}

// ========== atomicity and retry ==========

#[tokio::test]
async fn test_failures_leave_no_partial_writes() {
    for point in [
        FailPoint::AccountSave { after: 0 },
        FailPoint::AccountSave { after: 1 },
        FailPoint::AccountSave { after: 2 },
        FailPoint::TransactionInsert,
        FailPoint::Commit,
    ] {
        let fx = Fixture::new().await;
        let before = fx.store.accounts().await;
        fx.store.inject(point).await;

        let err = fx
            .engine
            .send_money(caller(&fx.alice), &fx.bob.mobile, dec!(150), PIN)
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::Storage(_)), "{point:?}");
        let mut after = fx.store.accounts().await;
        let mut before = before.clone();
        after.sort_by_key(|a| a.id);
        before.sort_by_key(|a| a.id);
        assert_eq!(after, before, "{point:?}");
        assert!(fx.store.transactions().await.is_empty(), "{point:?}");
    }
}

#[tokio::test]
async fn test_conflicts_are_retried() {
    let fx = Fixture::new().await;
    fx.store.inject(FailPoint::CommitConflict).await;
    fx.store.inject(FailPoint::CommitConflict).await;

    fx.engine
        .send_money(caller(&fx.alice), &fx.bob.mobile, dec!(150), PIN)
        .await
        .unwrap();

    assert_eq!(fx.account(fx.alice.id).await.balance, dec!(45));
    assert_eq!(fx.store.transactions().await.len(), 1);
}

#[tokio::test]
async fn test_retries_give_up_after_max_attempts() {
    let fx = Fixture::new().await;
    for _ in 0..3 {
        fx.store.inject(FailPoint::CommitConflict).await;
    }

    let err = fx
        .engine
        .cash_in(caller(&fx.agent), &fx.bob.mobile, dec!(10), PIN)
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::ConcurrentModification));
    assert_eq!(fx.account(fx.bob.id).await.balance, Decimal::ZERO);
}

// ========== treasury ==========

#[tokio::test]
async fn test_resolve_treasury() {
    let store = MemoryLedgerStore::new();
    let err = LedgerEngine::resolve_treasury(&store, None).await.unwrap_err();
    assert!(matches!(err, LedgerError::TreasuryUnavailable(_)));

    let fx = Fixture::new().await;
    let found = LedgerEngine::resolve_treasury(&fx.store, None).await.unwrap();
    assert_eq!(found, fx.treasury.id);

    let err = LedgerEngine::resolve_treasury(&fx.store, Some(fx.alice.id)).await;
    assert!(matches!(err, Err(LedgerError::TreasuryUnavailable(_))));
    let err = LedgerEngine::resolve_treasury(&fx.store, Some(AccountId::new())).await;
    assert!(matches!(err, Err(LedgerError::TreasuryUnavailable(_))));

    let second = fx.add(Role::Admin, "01766666666", Decimal::ZERO, Decimal::ZERO).await;
    let err = LedgerEngine::resolve_treasury(&fx.store, None).await;
    assert!(matches!(err, Err(LedgerError::TreasuryUnavailable(_))));
    let found = LedgerEngine::resolve_treasury(&fx.store, Some(second.id)).await.unwrap();
    assert_eq!(found, second.id);
}

#[tokio::test]
async fn test_resolve_treasury_ignores_admin_signups() {
    let fx = Fixture::new().await;
    let signup = fx.engine.register(new_account("01877777777", Role::Admin)).await.unwrap();
    assert_eq!(signup.status, AccountStatus::Pending);

    let found = LedgerEngine::resolve_treasury(&fx.store, None).await.unwrap();
    assert_eq!(found, fx.treasury.id);

    fx.set_status(signup.id, AccountStatus::Rejected).await;
    let found = LedgerEngine::resolve_treasury(&fx.store, None).await.unwrap();
    assert_eq!(found, fx.treasury.id);
}

// ========== account lifecycle ==========

fn new_account(mobile: &str, role: Role) -> NewAccount {
    NewAccount {
        name: "Rahim".to_string(),
        mobile: mobile.to_string(),
        email: format!("{mobile}@Example.com"),
        nid: format!("NID-{mobile}"),
        pin: PIN.to_string(),
        role,
    }
}

#[tokio::test]
async fn test_register_applies_role_defaults() {
    let fx = Fixture::new().await;

    let user = fx.engine.register(new_account("01811111111", Role::User)).await.unwrap();
    assert_eq!(user.status, AccountStatus::Active);
    assert_eq!(user.balance, dec!(40));
    assert_eq!(user.email, "01811111111@example.com");
    assert_ne!(user.pin_hash, PIN);

    let agent = fx.engine.register(new_account("01822222222", Role::Agent)).await.unwrap();
    assert_eq!(agent.status, AccountStatus::Pending);
    assert_eq!(agent.balance, dec!(100000));
    assert_eq!(agent.income, Decimal::ZERO);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let fx = Fixture::new().await;
    fx.engine.register(new_account("01811111111", Role::User)).await.unwrap();

    let mut dup = new_account("01811111111", Role::User);
    dup.email = "other@example.com".to_string();
    dup.nid = "other".to_string();
    let err = fx.engine.register(dup).await.unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateAccount(field) if field == "mobile"));

    let mut bad_pin = new_account("01833333333", Role::User);
    bad_pin.pin = "12a45".to_string();
    assert!(matches!(
        fx.engine.register(bad_pin).await,
        Err(LedgerError::InvalidInput(_))
    ));

    let mut bad_email = new_account("01844444444", Role::User);
    bad_email.email = "not-an-email".to_string();
    assert!(matches!(
        fx.engine.register(bad_email).await,
        Err(LedgerError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_register_rejects_malformed_emails() {
    let fx = Fixture::new().await;
    for (i, email) in ["a@.", "a@b..", "@example.com", "rahim@", "rahim example@x.com"]
        .into_iter()
        .enumerate()
    {
        let mut input = new_account(&format!("0185555555{i}"), Role::User);
        input.email = email.to_string();
        let result = fx.engine.register(input).await;
        assert!(
            matches!(result, Err(LedgerError::InvalidInput(_))),
            "{email} was accepted"
        );
    }
}

#[tokio::test]
async fn test_login_by_mobile_or_email() {
    let fx = Fixture::new().await;
    let account = fx.engine.register(new_account("01811111111", Role::User)).await.unwrap();

    let by_mobile = fx.engine.login("01811111111", PIN).await.unwrap();
    assert_eq!(by_mobile.id, account.id);
    let by_email = fx.engine.login("01811111111@EXAMPLE.com", PIN).await.unwrap();
    assert_eq!(by_email.id, account.id);

    assert!(matches!(
        fx.engine.login("01811111111", WRONG_PIN).await,
        Err(LedgerError::InvalidCredentials)
    ));
    assert!(matches!(
        fx.engine.login("nobody", PIN).await,
        Err(LedgerError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_set_account_status() {
    let fx = Fixture::new().await;
    let admin = caller(&fx.treasury);
    let agent = fx.engine.register(new_account("01822222222", Role::Agent)).await.unwrap();

    let pending = fx.engine.pending_agents(admin, PageRequest::default()).await.unwrap();
    assert_eq!(pending.data.len(), 1);
    assert_eq!(pending.data[0].id, agent.id);

    let approved = fx
        .engine
        .set_account_status(admin, agent.id, AccountStatus::Active)
        .await
        .unwrap();
    assert_eq!(approved.status, AccountStatus::Active);
    assert!(
        fx.engine
            .pending_agents(admin, PageRequest::default())
            .await
            .unwrap()
            .data
            .is_empty()
    );

    let err = fx
        .engine
        .set_account_status(admin, agent.id, AccountStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InvalidStatusTransition {
            from: AccountStatus::Active,
            to: AccountStatus::Rejected
        }
    ));

    let err = fx
        .engine
        .set_account_status(admin, fx.treasury.id, AccountStatus::Blocked)
        .await;
    assert!(matches!(err, Err(LedgerError::PermissionDenied(_))));

    let err = fx
        .engine
        .set_account_status(caller(&fx.alice), fx.bob.id, AccountStatus::Blocked)
        .await;
    assert!(matches!(err, Err(LedgerError::PermissionDenied(_))));
}

#[tokio::test]
async fn test_lookup_recipient_and_list_accounts() {
    let fx = Fixture::new().await;

    let view = fx.engine.lookup_recipient(&fx.agent.mobile).await.unwrap();
    assert_eq!(view.id, fx.agent.id);
    assert_eq!(view.account_type, Role::Agent);

    let users = fx
        .engine
        .list_accounts(
            caller(&fx.treasury),
            AccountFilter {
                role: Some(Role::User),
                status: None,
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(users.meta.total, 2);

    let err = fx
        .engine
        .list_accounts(caller(&fx.alice), AccountFilter::default(), PageRequest::default())
        .await;
    assert!(matches!(err, Err(LedgerError::PermissionDenied(_))));
}

// ========== queries ==========

#[tokio::test]
async fn test_transactions_for_account_visibility() {
    let fx = Fixture::new().await;
    let first = fx
        .engine
        .send_money(caller(&fx.alice), &fx.bob.mobile, dec!(50), PIN)
        .await
        .unwrap();
    let second = fx
        .engine
        .cash_in(caller(&fx.agent), &fx.bob.mobile, dec!(10), PIN)
        .await
        .unwrap();

    let own = fx
        .engine
        .transactions_for_account(caller(&fx.bob), fx.bob.id, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(own.data, vec![second, first.clone()]);

    let alice = fx
        .engine
        .transactions_for_account(caller(&fx.treasury), fx.alice.id, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(alice.data, vec![first]);

    let err = fx
        .engine
        .transactions_for_account(caller(&fx.alice), fx.bob.id, PageRequest::default())
        .await;
    assert!(matches!(err, Err(LedgerError::PermissionDenied(_))));

    let err = fx.engine.all_transactions(caller(&fx.bob), PageRequest::default()).await;
    assert!(matches!(err, Err(LedgerError::PermissionDenied(_))));
    let all = fx
        .engine
        .all_transactions(caller(&fx.treasury), PageRequest::new(1, 1))
        .await
        .unwrap();
    assert_eq!(all.data.len(), 1);
    assert_eq!(all.meta.total, 2);
    assert_eq!(all.meta.total_pages, 2);
}

#[tokio::test]
async fn test_system_stats_after_send_money() {
    let fx = Fixture::new().await;
    let before = fx.total_value().await;

    fx.engine
        .send_money(caller(&fx.alice), &fx.bob.mobile, dec!(150), PIN)
        .await
        .unwrap();

    let stats = fx.engine.system_stats(caller(&fx.treasury)).await.unwrap();
    assert_eq!(stats.total_balance, dec!(100195));
    assert_eq!(stats.treasury_income, dec!(5));
    assert_eq!(stats.total_balance + stats.total_income, before);
    assert_eq!(stats.users, 2);
    assert_eq!(stats.agents, 1);
    assert_eq!(stats.admins, 1);
    assert_eq!(stats.transactions, 1);
    assert_eq!(stats.pending_requests, 0);

    let err = fx.engine.system_stats(caller(&fx.agent)).await;
    assert!(matches!(err, Err(LedgerError::PermissionDenied(_))));
}

#[tokio::test]
async fn test_engine_uses_configured_fees() {
    let config = LedgerConfig {
        send_money_fee: dec!(7),
        send_money_fee_threshold: dec!(60),
        ..LedgerConfig::default()
    };
    let fx = Fixture::with_config(config).await;

    let record = fx
        .engine
        .send_money(caller(&fx.alice), &fx.bob.mobile, dec!(60), PIN)
        .await
        .unwrap();
    assert_eq!(record.fee(), dec!(7));

    let other = LedgerEngine::new(
        Arc::new(fx.store.clone()) as Arc<dyn LedgerStore>,
        Arc::new(PlainVerifier),
        fx.treasury.id,
        LedgerConfig::default(),
    );
    assert_eq!(other.fees().send_money_fee(dec!(60)), Decimal::ZERO);
}

// ========== admin authority ==========

#[tokio::test]
async fn test_admin_token_needs_an_active_admin_account() {
    let fx = Fixture::new().await;
    let signup = fx.engine.register(new_account("01877777777", Role::Admin)).await.unwrap();
    let blocked = fx.add(Role::Admin, "01788888888", Decimal::ZERO, Decimal::ZERO).await;
    fx.set_status(blocked.id, AccountStatus::Blocked).await;
    let page = PageRequest::default();

    for admin in [caller(&signup), caller(&blocked)] {
        let err = fx
            .engine
            .set_account_status(admin, signup.id, AccountStatus::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::PermissionDenied(_)));

        let err = fx
            .engine
            .set_account_status(admin, blocked.id, AccountStatus::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::PermissionDenied(_)));

        assert!(matches!(
            fx.engine.list_accounts(admin, AccountFilter::default(), page).await,
            Err(LedgerError::PermissionDenied(_))
        ));
        assert!(matches!(
            fx.engine.all_transactions(admin, page).await,
            Err(LedgerError::PermissionDenied(_))
        ));
        assert!(matches!(
            fx.engine.system_stats(admin).await,
            Err(LedgerError::PermissionDenied(_))
        ));
        assert!(matches!(
            fx.engine.transactions_for_account(admin, fx.alice.id, page).await,
            Err(LedgerError::PermissionDenied(_))
        ));
    }

    assert_eq!(fx.account(signup.id).await.status, AccountStatus::Pending);
    assert_eq!(fx.account(blocked.id).await.status, AccountStatus::Blocked);
}

#[tokio::test]
async fn test_admin_role_must_match_stored_account() {
    let fx = Fixture::new().await;
    let forged = Caller::new(fx.alice.id, Role::Admin);

    let err = fx.engine.system_stats(forged).await.unwrap_err();
    assert!(matches!(err, LedgerError::PermissionDenied(_)));

    let unknown = Caller::new(AccountId::new(), Role::Admin);
    let err = fx.engine.system_stats(unknown).await.unwrap_err();
    assert!(matches!(err, LedgerError::PermissionDenied(_)));
}
