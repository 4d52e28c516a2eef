//! Agent routes: float and income requests, and the agent dashboard.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use swiftpay_core::ledger::TransactionView;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the agent routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/agent/balance-request", post(balance_request))
        .route("/agent/withdrawal-request", post(withdrawal_request))
        .route("/agent/stats", get(stats))
}

/// Body for a balance request. The amount defaults to the configured float top-up.
#[derive(Debug, Deserialize)]
pub struct BalanceRequestBody {
    /// Requested float.
    pub amount: Option<Decimal>,
    /// Agent's PIN.
    pub pin: String,
    /// Free text for the reviewing admin.
    pub note: Option<String>,
}

/// Body for a withdrawal request.
#[derive(Debug, Deserialize)]
pub struct WithdrawalRequestBody {
    /// Income to pay out.
    pub amount: Decimal,
    /// Agent's PIN.
    pub pin: String,
    /// Free text for the reviewing admin.
    pub note: Option<String>,
}

/// POST /agent/balance-request
async fn balance_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<BalanceRequestBody>,
) -> Result<Response, ApiError> {
    let record = state
        .engine
        .submit_balance_request(auth.caller(), payload.amount, &payload.pin, payload.note)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "request": TransactionView::from(&record) })),
    )
        .into_response())
}

/// POST /agent/withdrawal-request
async fn withdrawal_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<WithdrawalRequestBody>,
) -> Result<Response, ApiError> {
    let record = state
        .engine
        .submit_withdrawal_request(auth.caller(), payload.amount, &payload.pin, payload.note)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "request": TransactionView::from(&record) })),
    )
        .into_response())
}

/// GET /agent/stats
async fn stats(State(state): State<AppState>, auth: AuthUser) -> Result<Response, ApiError> {
    let stats = state.engine.agent_stats(auth.caller()).await?;
    Ok(Json(stats).into_response())
}
