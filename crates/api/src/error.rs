//! Converts [`LedgerError`] into an HTTP response carrying the structured
//! error shape `{error: true, code, message, details}` (spec 6).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use zeltra_core::ledger::LedgerError;
use zeltra_core::statement::StatementError;

/// Wraps either a ledger or a statement-engine error so it can be returned
/// directly from an Axum handler.
pub enum ApiError {
    /// A voucher/balance/period admission failure.
    Ledger(LedgerError),
    /// A statement-rendering or reconciliation failure.
    Statement(StatementError),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<StatementError> for ApiError {
    fn from(err: StatementError) -> Self {
        Self::Statement(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Ledger(err) => (err.http_status_code(), err.error_code(), err.to_string()),
            Self::Statement(err) => (422, err.error_code(), err.to_string()),
        };
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        tracing::warn!(code, "request failed");
        (status, Json(json!({ "error": true, "code": code, "message": message, "details": null }))).into_response()
    }
}
