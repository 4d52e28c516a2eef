//! Authentication routes for registration, login and the current account.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use swiftpay_core::ledger::{AccountView, NewAccount, Role};
use swiftpay_shared::AppError;
use swiftpay_shared::auth::{LoginRequest, RegisterRequest, TokenResponse};
use tracing::{error, info};
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Creates the auth routes that need a token.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// POST /auth/register - Open a new account.
///
/// Users start active with the signup bonus; agents and admins start
/// pending until an admin approves them.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    payload.validate()?;
    let Some(role) = Role::parse(&payload.account_type) else {
        return Err(AppError::Validation(format!(
            "unknown account type '{}'",
            payload.account_type
        ))
        .into());
    };

    let account = state
        .engine
        .register(NewAccount {
            name: payload.name,
            mobile: payload.mobile,
            email: payload.email,
            nid: payload.nid,
            pin: payload.pin,
            role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "account": AccountView::from(&account) })),
    )
        .into_response())
}

/// POST /auth/login - Exchange mobile or email plus PIN for a token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    payload.validate()?;
    let account = state.engine.login(&payload.identifier, &payload.pin).await?;

    let token = state
        .jwt_service
        .generate_access_token(account.id.into_inner(), account.role.as_str())
        .map_err(|e| {
            error!(error = %e, "Failed to generate access token");
            AppError::Internal(e.to_string())
        })?;

    info!(account_id = %account.id, role = %account.role, "Account logged in");

    Ok((
        StatusCode::OK,
        Json(json!({
            "token": TokenResponse::bearer(token, state.jwt_service.expires_in()),
            "account": AccountView::from(&account),
        })),
    )
        .into_response())
}

/// GET /auth/me - The authenticated account.
async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Response, ApiError> {
    let account = state.engine.profile(auth.caller()).await?;
    Ok(Json(json!({ "account": AccountView::from(&account) })).into_response())
}
