//! Property-based tests for the ledger engine.
//!
//! - Property 3: Value conservation across transfers
//! - Property 4: Balances and incomes never go negative

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::testing::{Fixture, PIN, caller};
use super::types::Role;
use crate::workflow::Resolution;

#[derive(Debug, Clone)]
enum Op {
    SendMoney { from_alice: bool, cents: i64 },
    CashIn { cents: i64 },
    CashOut { cents: i64 },
    BalanceRequest { cents: i64, complete: bool },
    Withdrawal { cents: i64, complete: bool },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<bool>(), 1i64..30_000).prop_map(|(from_alice, cents)| Op::SendMoney { from_alice, cents }),
        (1i64..50_000).prop_map(|cents| Op::CashIn { cents }),
        (1i64..30_000).prop_map(|cents| Op::CashOut { cents }),
        (1i64..50_000, any::<bool>()).prop_map(|(cents, complete)| Op::BalanceRequest { cents, complete }),
        (1i64..200_000, any::<bool>()).prop_map(|(cents, complete)| Op::Withdrawal { cents, complete }),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property 3.1: Every operation changes the sum of balances plus incomes
    /// by exactly its external flow.
    ///
    /// Send-money and cash-in move value between accounts. Cash-out removes
    /// the principal twice (user e-money and agent float leave as cash).
    /// A completed balance request mints the amount plus the request fee; a
    /// completed withdrawal pays out the amount and mints the fee.
    /// Property 4.1: No balance or income is ever negative.
    #[test]
    fn prop_operations_conserve_value(ops in proptest::collection::vec(op_strategy(), 1..25)) {
        runtime().block_on(async {
            let fx = Fixture::new().await;
            let fee = fx.engine.fees().request_fee();
            let admin = caller(&fx.treasury);
            let agent = caller(&fx.agent);
            let mut expected = fx.total_value().await;

            for op in ops {
                match op {
                    Op::SendMoney { from_alice, cents } => {
                        let (from, to) = if from_alice { (&fx.alice, &fx.bob) } else { (&fx.bob, &fx.alice) };
                        let _ = fx.engine.send_money(caller(from), &to.mobile, Decimal::new(cents, 2), PIN).await;
                    }
                    Op::CashIn { cents } => {
                        let _ = fx.engine.cash_in(agent, &fx.bob.mobile, Decimal::new(cents, 2), PIN).await;
                    }
                    Op::CashOut { cents } => {
                        let amount = Decimal::new(cents, 2);
                        if fx.engine.cash_out(caller(&fx.alice), &fx.agent.mobile, amount, PIN).await.is_ok() {
                            expected -= amount + amount;
                        }
                    }
                    Op::BalanceRequest { cents, complete } => {
                        let amount = Decimal::new(cents, 2);
                        let record = fx.engine.submit_balance_request(agent, Some(amount), PIN, None).await.unwrap();
                        let resolution = if complete { Resolution::Complete } else { Resolution::Reject };
                        fx.engine.resolve_request(admin, record.id, resolution).await.unwrap();
                        if complete {
                            expected += amount + fee;
                        }
                    }
                    Op::Withdrawal { cents, complete } => {
                        let amount = Decimal::new(cents, 2);
                        if let Ok(record) = fx.engine.submit_withdrawal_request(agent, amount, PIN, None).await {
                            let resolution = if complete { Resolution::Complete } else { Resolution::Reject };
                            fx.engine.resolve_request(admin, record.id, resolution).await.unwrap();
                            if complete {
                                expected += fee - amount;
                            }
                        }
                    }
                }

                prop_assert_eq!(fx.total_value().await, expected);
                for account in fx.store.accounts().await {
                    prop_assert!(account.balance >= Decimal::ZERO, "{account:?}");
                    prop_assert!(account.income >= Decimal::ZERO, "{account:?}");
                }
            }

            let treasury = fx.account(fx.treasury.id).await;
            prop_assert_eq!(treasury.role, Role::Admin);
            prop_assert_eq!(treasury.balance, Decimal::ZERO);
            Ok(())
        })?;
    }
}
