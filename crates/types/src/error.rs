//! The error taxonomy shared by the dispatcher, auth layer, and HTTP surface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error code returned on `ActionResult.error`.
///
/// The HTTP layer maps each variant to a status code: auth errors to 401,
/// validation and resource errors to 400/422, idempotency conflicts to 409,
/// and `Internal` to 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    #[error("authentication required")]
    AuthRequired,
    #[error("invalid credentials")]
    AuthInvalid,

    #[error("requestId is required")]
    MissingRequestId,
    #[error("unknown action")]
    UnknownAction,
    #[error("malformed action arguments")]
    BadArgs,

    #[error("agent not found")]
    AgentNotFound,
    #[error("agent is banned")]
    AgentBanned,
    #[error("action not valid in current status")]
    InvalidStatus,
    #[error("agent is busy")]
    AgentBusy,

    #[error("precondition failed")]
    PreconditionFailed,

    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("insufficient inventory")]
    InsufficientInventory,

    #[error("a request with this id is already in progress")]
    DuplicateRequestInProgress,

    #[error("internal error")]
    Internal,
}

impl ErrorCode {
    /// Whether this error class is deterministic: re-dispatching the same
    /// `(agentId, requestId)` would fail identically, so the ActionLock
    /// should record the result. Transient errors remove the lock instead so
    /// the client may retry under the same requestId.
    pub fn is_deterministic(self) -> bool {
        !matches!(self, ErrorCode::Internal)
    }
}
