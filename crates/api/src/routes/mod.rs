//! API route definitions.

use axum::{Router, middleware};
use serde::Deserialize;
use swiftpay_shared::types::PageRequest;

use crate::{AppState, middleware::auth_middleware};

pub mod admin;
pub mod agent;
pub mod auth;
pub mod health;
pub mod transactions;
pub mod users;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(users::routes())
        .merge(transactions::routes())
        .merge(agent::routes())
        .merge(admin::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(auth::routes())
        .merge(protected_routes)
}

/// Paging parameters accepted by every list endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Converts to a normalized page request.
    #[must_use]
    pub fn to_request(self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        )
    }
}
