//! Admin routes: request approval, account management and system stats.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use serde::Deserialize;
use serde_json::json;
use swiftpay_core::ledger::{
    AccountFilter, AccountStatus, AccountView, RequestKind, Role, TransactionView,
};
use swiftpay_core::workflow::{RequestStatus, Resolution};
use swiftpay_shared::types::{AccountId, TransactionId};
use uuid::Uuid;

use super::PageQuery;
use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/balance-requests", get(list_balance_requests))
        .route("/admin/balance-requests/{id}", patch(resolve_request))
        .route("/admin/withdrawal-requests", get(list_withdrawal_requests))
        .route("/admin/withdrawal-requests/{id}", patch(resolve_request))
        .route("/admin/agent-approvals", get(pending_agents))
        .route("/admin/agent-approvals/{id}", patch(set_status))
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}/status", patch(set_status))
        .route("/admin/stats", get(stats))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query for request listings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RequestListQuery {
    /// Only requests in this status.
    pub status: Option<RequestStatus>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Query for account listings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct UserListQuery {
    /// Only accounts with this role.
    pub role: Option<Role>,
    /// Only accounts in this status.
    pub status: Option<AccountStatus>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Body for resolving a request.
#[derive(Debug, Deserialize)]
pub struct ResolveBody {
    /// `completed` or `rejected`.
    pub status: Resolution,
}

/// Body for an account status change.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    /// Target status.
    pub status: AccountStatus,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_requests(
    state: &AppState,
    auth: AuthUser,
    kind: RequestKind,
    query: RequestListQuery,
) -> Result<Response, ApiError> {
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let requests = state
        .engine
        .list_requests(auth.caller(), kind, query.status, page.to_request())
        .await?;
    Ok(Json(requests.map(|r| TransactionView::from(&r))).into_response())
}

/// GET /admin/balance-requests
async fn list_balance_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RequestListQuery>,
) -> Result<Response, ApiError> {
    list_requests(&state, auth, RequestKind::BalanceRequest, query).await
}

/// GET /admin/withdrawal-requests
async fn list_withdrawal_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RequestListQuery>,
) -> Result<Response, ApiError> {
    list_requests(&state, auth, RequestKind::WithdrawalRequest, query).await
}

/// PATCH /admin/{balance,withdrawal}-requests/{id} - Complete or reject.
async fn resolve_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResolveBody>,
) -> Result<Response, ApiError> {
    let record = state
        .engine
        .resolve_request(auth.caller(), TransactionId::from_uuid(id), payload.status)
        .await?;
    Ok(Json(json!({ "request": TransactionView::from(&record) })).into_response())
}

/// GET /admin/agent-approvals - Agents awaiting approval.
async fn pending_agents(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let agents = state
        .engine
        .pending_agents(auth.caller(), page.to_request())
        .await?;
    Ok(Json(agents.map(|a| AccountView::from(&a))).into_response())
}

/// GET /admin/users
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UserListQuery>,
) -> Result<Response, ApiError> {
    let filter = AccountFilter {
        role: query.role,
        status: query.status,
    };
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let accounts = state
        .engine
        .list_accounts(auth.caller(), filter, page.to_request())
        .await?;
    Ok(Json(accounts.map(|a| AccountView::from(&a))).into_response())
}

/// PATCH /admin/users/{id}/status and /admin/agent-approvals/{id}
async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusBody>,
) -> Result<Response, ApiError> {
    let account = state
        .engine
        .set_account_status(auth.caller(), AccountId::from_uuid(id), payload.status)
        .await?;
    Ok(Json(json!({ "account": AccountView::from(&account) })).into_response())
}

/// GET /admin/stats
async fn stats(State(state): State<AppState>, auth: AuthUser) -> Result<Response, ApiError> {
    let stats = state.engine.system_stats(auth.caller()).await?;
    Ok(Json(stats).into_response())
}
