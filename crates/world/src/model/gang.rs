//! Gang, gang invites, and territory control (spec §3).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use clawcity_types::{AgentId, Amount, GangId, Tick, ZoneId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gang {
    pub id: GangId,
    pub name: String,
    pub leader_id: AgentId,
    pub treasury: Amount,
    pub reputation: i64,
    pub home_zone_id: ZoneId,
    pub members: HashSet<AgentId>,
    pub created_at: DateTime<Utc>,
}

impl Gang {
    /// Denormalized member count, kept in sync under the same transaction
    /// that mutates membership (spec §3).
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GangInviteStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GangInvite {
    pub id: uuid::Uuid,
    pub gang_id: GangId,
    pub invited_agent_id: AgentId,
    pub invited_by: AgentId,
    pub status: GangInviteStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at_tick: Tick,
}

/// At most one territory per zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Territory {
    pub zone_id: ZoneId,
    pub gang_id: GangId,
    pub control_strength: i32,
    pub income_per_tick: Amount,
    pub claimed_at: Tick,
    pub last_defended_tick: Tick,
}

impl Territory {
    pub fn decay(&mut self, amount: i32) {
        self.control_strength = (self.control_strength - amount).max(0);
    }

    pub fn is_lost(&self) -> bool {
        self.control_strength <= 0
    }
}
