//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in the system is a `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Maximum decimal places accepted on a principal amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Decimal places kept on computed fees.
pub const FEE_SCALE: u32 = 4;

/// Returns true if `amount` has no more than [`AMOUNT_SCALE`] decimal places.
#[must_use]
pub fn has_valid_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= AMOUNT_SCALE
}

/// Rounds a computed fee to [`FEE_SCALE`] places using Banker's Rounding.
#[must_use]
pub fn round_fee(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(FEE_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Applies a percentage rate (e.g. `0.01` for 1%) and rounds the result as a fee.
#[must_use]
pub fn rate_of(amount: Decimal, rate: Decimal) -> Decimal {
    round_fee(amount * rate)
}
