//! Repository implementations.

pub mod ledger;

pub use ledger::{LedgerRepository, PgLedgerUnit};
