//! Shared types, errors, and configuration for SwiftPay.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for accounts and transactions
//! - Money helpers with decimal precision
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - JWT issuance and validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, LedgerConfig};
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
