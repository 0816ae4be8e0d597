//! `ActionLock`: the `(agentId, requestId) -> result` idempotency table
//! (spec §3, §4.2 step 2, §5 "Cancellation and timeouts").

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use clawcity_types::AgentId;
use serde_json::Value;
use tokio::sync::Mutex;

/// Minimum time-to-live for a reservation before it may be reaped and the
/// client allowed to retry with the same `requestId` (spec §5).
pub const MIN_TTL: Duration = Duration::hours(24);

#[derive(Debug, Clone)]
pub struct ActionLock {
    pub agent_id: AgentId,
    pub request_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// `None` while dispatch is in flight; set exactly once on completion.
    pub result: Option<Value>,
}

/// Outcome of checking a `(agentId, requestId)` pair before dispatch.
pub enum IdempotencyCheck {
    /// No prior attempt (or the prior reservation expired and was reaped):
    /// dispatch may proceed.
    Fresh,
    /// A completed attempt exists; return its result verbatim without
    /// re-running the handler.
    Replay(Value),
    /// A reservation exists and is still within its TTL with no result yet:
    /// another dispatch for this exact `(agentId, requestId)` is in flight.
    InProgress,
}

#[derive(Debug, Default)]
pub struct ActionLockStore {
    locks: Mutex<HashMap<(AgentId, String), ActionLock>>,
}

impl ActionLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-reserve in one step, per spec §4.2 step 2: look up the
    /// pair; if a result already exists, report it for replay; if a live
    /// reservation exists, report in-progress; otherwise insert a fresh
    /// reservation and report `Fresh`.
    pub async fn check_and_reserve(&self, agent_id: AgentId, request_id: &str, now: DateTime<Utc>) -> IdempotencyCheck {
        let mut locks = self.locks.lock().await;
        let key = (agent_id, request_id.to_string());

        if let Some(existing) = locks.get(&key) {
            if let Some(result) = &existing.result {
                return IdempotencyCheck::Replay(result.clone());
            }
            if existing.expires_at > now {
                return IdempotencyCheck::InProgress;
            }
            tracing::debug!(%agent_id, request_id, "reaping expired in-flight reservation");
        }

        locks.insert(
            key,
            ActionLock {
                agent_id,
                request_id: request_id.to_string(),
                created_at: now,
                expires_at: now + MIN_TTL,
                result: None,
            },
        );
        IdempotencyCheck::Fresh
    }

    /// Record the final result of a dispatch. Per spec §4.2 step 10 /
    /// handler contract (g): this is the last write of a successful or
    /// deterministically-failed action.
    pub async fn fulfill(&self, agent_id: AgentId, request_id: &str, result: Value) {
        let mut locks = self.locks.lock().await;
        if let Some(lock) = locks.get_mut(&(agent_id, request_id.to_string())) {
            lock.result = Some(result);
        }
    }

    /// Remove a reservation outright, used when a handler fails transiently
    /// (spec §7 "Errors from the tick pipeline ... do not advance the tick";
    /// §5 propagation policy: transient failures remove the lock so the
    /// client may retry under the same `requestId`).
    pub async fn release(&self, agent_id: AgentId, request_id: &str) {
        let mut locks = self.locks.lock().await;
        locks.remove(&(agent_id, request_id.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn fresh_then_in_progress_then_replay() {
        let store = ActionLockStore::new();
        let agent = Uuid::new_v4();
        let now = Utc::now();

        assert!(matches!(
            store.check_and_reserve(agent, "r1", now).await,
            IdempotencyCheck::Fresh
        ));
        assert!(matches!(
            store.check_and_reserve(agent, "r1", now).await,
            IdempotencyCheck::InProgress
        ));

        store.fulfill(agent, "r1", json!({"ok": true})).await;
        match store.check_and_reserve(agent, "r1", now).await {
            IdempotencyCheck::Replay(v) => assert_eq!(v, json!({"ok": true})),
            _ => panic!("expected replay"),
        }
    }

    #[tokio::test]
    async fn release_allows_retry_with_same_request_id() {
        let store = ActionLockStore::new();
        let agent = Uuid::new_v4();
        let now = Utc::now();

        store.check_and_reserve(agent, "r1", now).await;
        store.release(agent, "r1").await;

        assert!(matches!(
            store.check_and_reserve(agent, "r1", now).await,
            IdempotencyCheck::Fresh
        ));
    }

    #[tokio::test]
    async fn expired_reservation_is_reaped() {
        let store = ActionLockStore::new();
        let agent = Uuid::new_v4();
        let now = Utc::now();

        store.check_and_reserve(agent, "r1", now).await;
        let later = now + MIN_TTL + Duration::seconds(1);

        assert!(matches!(
            store.check_and_reserve(agent, "r1", later).await,
            IdempotencyCheck::Fresh
        ));
    }
}
