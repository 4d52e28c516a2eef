//! Property-based tests for amount validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::validation::{validate_amount, validate_minimum};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* positive amount with at most two decimal places, validation SHALL pass.
    #[test]
    fn prop_valid_amounts_accepted(cents in 1i64..1_000_000_000i64) {
        prop_assert!(validate_amount(Decimal::new(cents, 2)).is_ok());
    }

    /// *For any* zero or negative amount, validation SHALL reject it.
    #[test]
    fn prop_non_positive_rejected(cents in -1_000_000_000i64..=0i64) {
        let result = validate_amount(Decimal::new(cents, 2));
        prop_assert!(matches!(result, Err(LedgerError::InvalidAmount(_))), "got {:?}", result);
    }

    /// *For any* amount with a non-zero third decimal place, validation SHALL reject it.
    #[test]
    fn prop_sub_cent_rejected(mills in 1i64..1_000_000_000i64) {
        prop_assume!(mills % 10 != 0);
        let result = validate_amount(Decimal::new(mills, 3));
        prop_assert!(matches!(result, Err(LedgerError::InvalidAmount(_))), "got {:?}", result);
    }

    /// Trailing zeros do not count as precision.
    #[test]
    fn prop_trailing_zeros_accepted(cents in 1i64..1_000_000i64) {
        prop_assert!(validate_amount(Decimal::new(cents * 100, 4)).is_ok());
    }

    /// *For any* floor, amounts below it are rejected and amounts at or above pass.
    #[test]
    fn prop_minimum_is_inclusive(floor in 1i64..10_000i64, delta in 0i64..10_000i64) {
        let floor = Decimal::from(floor);
        let above = floor + Decimal::new(delta, 2);
        prop_assert!(validate_minimum(above, floor).is_ok());
        prop_assert!(validate_minimum(floor - Decimal::new(1, 2), floor).is_err());
    }
}
