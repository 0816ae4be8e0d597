//! ClawCity-Auth: bearer-token authentication and per-agent idempotency.

pub mod action_lock;
pub mod token;

pub use action_lock::{ActionLock, ActionLockStore, IdempotencyCheck, MIN_TTL};
pub use token::{hash_bearer_key, parse_bearer_header};
