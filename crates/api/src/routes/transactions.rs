//! Money movement and transaction history routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use swiftpay_core::ledger::{Role, TransactionRecord, TransactionView};
use swiftpay_shared::types::AccountId;
use uuid::Uuid;

use super::PageQuery;
use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions/send-money", post(send_money))
        .route("/transactions/cash-in", post(cash_in))
        .route("/transactions/cash-out", post(cash_out))
        .route("/transactions", get(list_transactions))
        .route("/transactions/{account_id}", get(account_transactions))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body shared by send-money, cash-in and cash-out.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Counterparty mobile number.
    pub mobile: String,
    /// Principal.
    pub amount: Decimal,
    /// Caller's PIN.
    pub pin: String,
}

fn created(record: &TransactionRecord) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({ "transaction": TransactionView::from(record) })),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /transactions/send-money - User to user transfer.
async fn send_money(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TransferRequest>,
) -> Result<Response, ApiError> {
    let record = state
        .engine
        .send_money(auth.caller(), &payload.mobile, payload.amount, &payload.pin)
        .await?;
    Ok(created(&record))
}

/// POST /transactions/cash-in - Agent hands e-money to a user.
async fn cash_in(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TransferRequest>,
) -> Result<Response, ApiError> {
    let record = state
        .engine
        .cash_in(auth.caller(), &payload.mobile, payload.amount, &payload.pin)
        .await?;
    Ok(created(&record))
}

/// POST /transactions/cash-out - User takes cash from an agent.
async fn cash_out(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TransferRequest>,
) -> Result<Response, ApiError> {
    let record = state
        .engine
        .cash_out(auth.caller(), &payload.mobile, payload.amount, &payload.pin)
        .await?;
    Ok(created(&record))
}

/// GET /transactions - Every record for admins, own records otherwise.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let caller = auth.caller();
    let page = if caller.role == Role::Admin {
        state.engine.all_transactions(caller, page.to_request()).await?
    } else {
        state
            .engine
            .transactions_for_account(caller, caller.account_id, page.to_request())
            .await?
    };
    Ok(Json(page.map(|r| TransactionView::from(&r))).into_response())
}

/// GET /transactions/{account_id} - Records of one account.
async fn account_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let account_id = AccountId::from_uuid(account_id);
    let page = state
        .engine
        .transactions_for_account(auth.caller(), account_id, page.to_request())
        .await?;
    Ok(Json(page.map(|r| TransactionView::from(&r))).into_response())
}
