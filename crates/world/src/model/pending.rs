//! Queued completion effects for deferred (`busy`) actions (spec §4.1 phase 2).
//!
//! `Agent.busy_action` is the human-readable tag (`"move"`, `"take_job"`,
//! ...); this enum is the structured counterpart the tick pipeline actually
//! executes once `busy_until_tick` is reached.

use clawcity_types::{AgentId, CoopActionId, JobId, ZoneId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PendingCompletion {
    Move { to_zone_id: ZoneId },
    TakeJob { job_id: JobId },
    Heal,
    Rest,
    /// A coop participant suspended until `executeAt`; the coop action
    /// itself (not this per-agent marker) carries the roster and type.
    CoopRendezvous { coop_action_id: CoopActionId },
    /// Used for NPC-issued busy actions with no further queued effect
    /// beyond clearing to idle.
    None,
}

#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub agent_id: AgentId,
    pub completion: PendingCompletion,
}
