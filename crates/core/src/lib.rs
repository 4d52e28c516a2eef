//! Core business logic for SwiftPay.
//!
//! This crate contains the ledger engine with ZERO web or database dependencies.
//! Storage is reached through the [`ledger::LedgerStore`] contract.
//!
//! # Modules
//!
//! - `ledger` - Accounts, fees, money movement and queries
//! - `workflow` - Balance and withdrawal request lifecycle
//! - `auth` - PIN hashing and verification

pub mod auth;
pub mod ledger;
pub mod workflow;
