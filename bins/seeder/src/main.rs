//! Database seeder for SwiftPay development and testing.
//!
//! Seeds the treasury admin plus one demo user and one demo agent, all
//! active and sharing the PIN `12345`. Accounts that already exist (by
//! mobile) are left alone, so the seeder can run repeatedly.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::Utc;
use rust_decimal::Decimal;
use swiftpay_core::auth::hash_pin;
use swiftpay_core::ledger::{Account, AccountStatus, LedgerStore, Role};
use swiftpay_db::LedgerRepository;
use swiftpay_shared::AppConfig;
use swiftpay_shared::types::AccountId;

/// PIN of every seeded account.
const DEMO_PIN: &str = "12345";

struct Seed {
    name: &'static str,
    mobile: &'static str,
    email: &'static str,
    nid: &'static str,
    role: Role,
}

const SEEDS: [Seed; 3] = [
    Seed {
        name: "SwiftPay Treasury",
        mobile: "01700000000",
        email: "treasury@swiftpay.dev",
        nid: "0000000000",
        role: Role::Admin,
    },
    Seed {
        name: "Demo User",
        mobile: "01711111111",
        email: "user@swiftpay.dev",
        nid: "1111111111",
        role: Role::User,
    },
    Seed {
        name: "Demo Agent",
        mobile: "01722222222",
        email: "agent@swiftpay.dev",
        nid: "2222222222",
        role: Role::Agent,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = swiftpay_db::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    let store = LedgerRepository::new(db);

    for seed in &SEEDS {
        println!("Seeding {} ({})...", seed.name, seed.mobile);
        if store.find_account_by_mobile(seed.mobile).await?.is_some() {
            println!("  Account already exists, skipping...");
            continue;
        }

        let balance = match seed.role {
            Role::User => config.ledger.initial_user_balance,
            Role::Agent => config.ledger.initial_agent_balance,
            Role::Admin => config.ledger.initial_admin_balance,
        };
        let account = Account {
            id: AccountId::new(),
            name: seed.name.to_string(),
            mobile: seed.mobile.to_string(),
            email: seed.email.to_string(),
            nid: seed.nid.to_string(),
            role: seed.role,
            status: AccountStatus::Active,
            balance,
            income: Decimal::ZERO,
            pin_hash: hash_pin(DEMO_PIN).context("Failed to hash PIN")?,
            created_at: Utc::now(),
        };
        store.insert_account(&account).await?;
        println!("  Created {} account {}", account.role, account.id);
    }

    println!("Seeding complete!");
    Ok(())
}
