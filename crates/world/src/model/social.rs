//! Friendship edges (spec §3).

use chrono::{DateTime, Utc};
use clawcity_types::{AgentId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Blocked,
}

/// Canonicalized so `agent1_id < agent2_id` always holds, preventing
/// duplicate edges between the same pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friendship {
    pub agent1_id: AgentId,
    pub agent2_id: AgentId,
    pub status: FriendshipStatus,
    pub initiator_id: AgentId,
    pub strength: i32,
    pub loyalty: i32,
    pub last_interaction_tick: Tick,
    pub created_at: DateTime<Utc>,
}

/// Order a pair of agent ids into the canonical `(smaller, larger)` form
/// used both for `Friendship` keys and for lock-ordering two-agent actions
/// (spec §5: "acquire both rows in a canonical order").
pub fn canonical_pair(a: AgentId, b: AgentId) -> (AgentId, AgentId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Friendship {
    pub fn new(a: AgentId, b: AgentId, initiator_id: AgentId, now: DateTime<Utc>, tick: Tick) -> Self {
        let (agent1_id, agent2_id) = canonical_pair(a, b);
        Self {
            agent1_id,
            agent2_id,
            status: FriendshipStatus::Pending,
            initiator_id,
            strength: 10,
            loyalty: 10,
            last_interaction_tick: tick,
            created_at: now,
        }
    }

    pub fn key(&self) -> (AgentId, AgentId) {
        (self.agent1_id, self.agent2_id)
    }

    pub fn is_strong(&self) -> bool {
        self.status == FriendshipStatus::Accepted && self.strength >= 75
    }
}
