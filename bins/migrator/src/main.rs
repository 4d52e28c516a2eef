//! Database migration runner for SwiftPay.
//!
//! Reads `DATABASE_URL` (from the environment or `.env`).
//!
//! Usage:
//!   migrator up      - Create the ledger schema
//!   migrator down    - Drop the ledger schema
//!   migrator status  - Show which migrations are applied
//!   migrator fresh   - Drop everything and recreate the schema

use sea_orm_migration::prelude::*;
use swiftpay_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI installs its own tracing subscriber
    cli::run_cli(Migrator).await;
}
