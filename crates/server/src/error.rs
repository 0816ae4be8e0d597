//! HTTP-layer error shape and the `ErrorCode -> StatusCode` mapping (spec §7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clawcity_types::ErrorCode;
use serde_json::json;

/// Maps each machine-readable error code to the status spec §6 prescribes.
/// Kept as a free function rather than a `From<ErrorCode> for StatusCode`
/// impl since neither type is local to this crate.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::AuthRequired | ErrorCode::AuthInvalid => StatusCode::UNAUTHORIZED,
        ErrorCode::MissingRequestId | ErrorCode::UnknownAction | ErrorCode::BadArgs => StatusCode::BAD_REQUEST,
        ErrorCode::AgentNotFound => StatusCode::NOT_FOUND,
        ErrorCode::DuplicateRequestInProgress => StatusCode::CONFLICT,
        ErrorCode::InsufficientFunds
        | ErrorCode::InsufficientInventory
        | ErrorCode::InvalidStatus
        | ErrorCode::PreconditionFailed
        | ErrorCode::AgentBanned
        | ErrorCode::AgentBusy => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A pre-dispatch validation/auth failure — anything rejected before a
/// handler ever touches the world, so there is no `ActionResult` to shape it
/// around yet.
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.code);
        let body = json!({ "ok": false, "error": self.code, "message": self.message });
        (status, Json(body)).into_response()
    }
}
