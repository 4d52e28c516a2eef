//! SwiftPay API Server
//!
//! Main entry point for the SwiftPay backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swiftpay_api::{AppState, create_router};
use swiftpay_core::auth::Argon2PinVerifier;
use swiftpay_core::ledger::LedgerEngine;
use swiftpay_db::{LedgerRepository, connect_with};
use swiftpay_shared::types::AccountId;
use swiftpay_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "swiftpay=debug,swiftpay_api=debug,swiftpay_core=debug,swiftpay_db=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    // Find the treasury before serving anything
    let store = Arc::new(LedgerRepository::new(db));
    let treasury = LedgerEngine::resolve_treasury(
        store.as_ref(),
        config.ledger.treasury_account_id.map(AccountId::from_uuid),
    )
    .await
    .context("Failed to resolve the treasury account")?;
    info!(%treasury, "Treasury account resolved");

    let engine = LedgerEngine::new(
        store,
        Arc::new(Argon2PinVerifier),
        treasury,
        config.ledger.clone(),
    );

    // Create application state
    let state = AppState {
        engine: Arc::new(engine),
        jwt_service: Arc::new(JwtService::new(&config.jwt)),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
