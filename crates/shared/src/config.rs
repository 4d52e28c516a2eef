//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Fee schedule, limits and account defaults for the ledger.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,
}

fn default_access_token_expiry() -> i64 {
    86_400 // 1 day
}

/// Ledger policy: fees, limits and registration defaults.
///
/// All amounts are in whole currency units (Tk).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Smallest amount accepted by send-money.
    pub send_money_min_amount: Decimal,
    /// Send-money amounts at or above this pay the flat fee.
    pub send_money_fee_threshold: Decimal,
    /// Flat send-money fee, credited to the treasury.
    pub send_money_fee: Decimal,
    /// Cash-out share credited to the agent's income.
    pub cash_out_agent_rate: Decimal,
    /// Cash-out share credited to the treasury's income.
    pub cash_out_treasury_rate: Decimal,
    /// Fee credited to the treasury when a request completes.
    pub request_fee: Decimal,
    /// Amount used for a balance request that names none.
    pub default_balance_request_amount: Decimal,
    /// Opening balance of a user account.
    pub initial_user_balance: Decimal,
    /// Opening float of an agent account.
    pub initial_agent_balance: Decimal,
    /// Opening balance of an admin account.
    pub initial_admin_balance: Decimal,
    /// Attempts for an operation that hits a retryable storage conflict.
    pub max_attempts: u32,
    /// Treasury account. When unset the single admin account is used.
    pub treasury_account_id: Option<Uuid>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            send_money_min_amount: Decimal::from(50),
            send_money_fee_threshold: Decimal::from(100),
            send_money_fee: Decimal::from(5),
            cash_out_agent_rate: Decimal::new(1, 2),
            cash_out_treasury_rate: Decimal::new(5, 3),
            request_fee: Decimal::from(5),
            default_balance_request_amount: Decimal::from(100_000),
            initial_user_balance: Decimal::from(40),
            initial_agent_balance: Decimal::from(100_000),
            initial_admin_balance: Decimal::ZERO,
            max_attempts: 3,
            treasury_account_id: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `SWIFTPAY__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if configuration cannot be loaded.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SWIFTPAY").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
