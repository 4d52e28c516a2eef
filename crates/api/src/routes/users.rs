//! Routes for the signed-in account's balance and recipient lookup.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use swiftpay_core::ledger::Role;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/balance", get(balance))
        .route("/users/check/{mobile}", get(check_recipient))
}

/// GET /users/balance - Balance, plus income for agents and admins.
async fn balance(State(state): State<AppState>, auth: AuthUser) -> Result<Response, ApiError> {
    let account = state.engine.profile(auth.caller()).await?;
    let body = if account.role == Role::User {
        json!({ "balance": account.balance })
    } else {
        json!({ "balance": account.balance, "income": account.income })
    };
    Ok(Json(body).into_response())
}

/// GET /users/check/{mobile} - Public details of a recipient before sending.
async fn check_recipient(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(mobile): Path<String>,
) -> Result<Response, ApiError> {
    let recipient = state.engine.lookup_recipient(&mobile).await?;
    Ok(Json(json!({ "account": recipient })).into_response())
}
