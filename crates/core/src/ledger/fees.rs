//! Fee schedule.
//!
//! All percentages are applied with decimal arithmetic and rounded with
//! Banker's Rounding to four places. A cash-out fee is the sum of its
//! rounded shares, so what the user pays always equals what the agent and
//! the treasury receive.

use rust_decimal::Decimal;
use swiftpay_shared::LedgerConfig;
use swiftpay_shared::types::money::rate_of;

/// Split of a cash-out fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashOutFee {
    /// Credited to the agent's income.
    pub agent_share: Decimal,
    /// Credited to the treasury's income.
    pub treasury_share: Decimal,
}

impl CashOutFee {
    /// Total fee paid by the user.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.agent_share + self.treasury_share
    }
}

/// Fee parameters taken from configuration.
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    send_money_fee_threshold: Decimal,
    send_money_fee: Decimal,
    cash_out_agent_rate: Decimal,
    cash_out_treasury_rate: Decimal,
    request_fee: Decimal,
}

impl FeeSchedule {
    /// Builds the schedule from ledger configuration.
    #[must_use]
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            send_money_fee_threshold: config.send_money_fee_threshold,
            send_money_fee: config.send_money_fee,
            cash_out_agent_rate: config.cash_out_agent_rate,
            cash_out_treasury_rate: config.cash_out_treasury_rate,
            request_fee: config.request_fee,
        }
    }

    /// Flat fee once the amount reaches the threshold, otherwise zero.
    #[must_use]
    pub fn send_money_fee(&self, amount: Decimal) -> Decimal {
        if amount >= self.send_money_fee_threshold {
            self.send_money_fee
        } else {
            Decimal::ZERO
        }
    }

    /// Cash-out fee, split between agent and treasury.
    #[must_use]
    pub fn cash_out_fee(&self, amount: Decimal) -> CashOutFee {
        CashOutFee {
            agent_share: rate_of(amount, self.cash_out_agent_rate),
            treasury_share: rate_of(amount, self.cash_out_treasury_rate),
        }
    }

    /// Fee credited to the treasury when a request completes.
    #[must_use]
    pub fn request_fee(&self) -> Decimal {
        self.request_fee
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::from_config(&LedgerConfig::default())
    }
}
