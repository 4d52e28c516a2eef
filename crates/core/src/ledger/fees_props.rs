//! Property-based tests for the fee schedule.
//!
//! - Property 1: Cash-out fee split is exact
//! - Property 2: Send-money fee is flat above the threshold

use proptest::prelude::*;
use rust_decimal::Decimal;
use swiftpay_shared::types::money::FEE_SCALE;

use super::fees::FeeSchedule;

/// Strategy to generate principal amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1.1: The fee charged equals the sum of the credited shares.
    ///
    /// *For any* amount, `total()` SHALL equal agent share plus treasury share.
    #[test]
    fn prop_cash_out_total_is_sum_of_shares(amount in positive_amount()) {
        let fee = FeeSchedule::default().cash_out_fee(amount);
        prop_assert_eq!(fee.total(), fee.agent_share + fee.treasury_share);
        prop_assert!(fee.agent_share >= Decimal::ZERO);
        prop_assert!(fee.treasury_share >= Decimal::ZERO);
    }

    /// Property 1.2: Each share is rounded to fee precision and within half a unit of the exact rate.
    #[test]
    fn prop_cash_out_shares_are_rounded(amount in positive_amount()) {
        let fee = FeeSchedule::default().cash_out_fee(amount);
        let half_unit = Decimal::new(5, FEE_SCALE + 1);

        prop_assert!(fee.agent_share.scale() <= FEE_SCALE);
        prop_assert!(fee.treasury_share.scale() <= FEE_SCALE);
        prop_assert!((fee.agent_share - amount * Decimal::new(1, 2)).abs() <= half_unit);
        prop_assert!((fee.treasury_share - amount * Decimal::new(5, 3)).abs() <= half_unit);
    }

    /// Property 2.1: Send-money fee is 0 below 100 and 5 from 100 upwards.
    #[test]
    fn prop_send_money_fee_threshold(amount in positive_amount()) {
        let fee = FeeSchedule::default().send_money_fee(amount);
        if amount >= Decimal::from(100) {
            prop_assert_eq!(fee, Decimal::from(5));
        } else {
            prop_assert_eq!(fee, Decimal::ZERO);
        }
    }
}
