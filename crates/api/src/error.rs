//! JSON error responses.
//!
//! Every failure leaves the API as `{"error": CODE, "message": text}` with
//! the status the error type reports. Server-side failures are logged and
//! their detail is not sent to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use swiftpay_core::ledger::LedgerError;
use swiftpay_shared::AppError;
use tracing::error;

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Ledger rule or storage failure.
    Ledger(LedgerError),
    /// Request validation, configuration or internal failure.
    App(AppError),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::App(errors.into())
    }
}

impl ApiError {
    fn parts(&self) -> (u16, &'static str, String) {
        match self {
            Self::Ledger(err) => (err.http_status_code(), err.error_code(), err.to_string()),
            Self::App(err) => (err.status_code(), err.error_code(), err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if status.is_server_error() {
            error!(error = %message, code, "Request failed");
            "An internal error occurred".to_string()
        } else {
            message
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
