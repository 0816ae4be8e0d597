//! Bounties (spec §3, §4.2 `PLACE_BOUNTY`/`CLAIM_BOUNTY`).

use chrono::{DateTime, Utc};
use clawcity_types::{AgentId, Amount, BountyId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BountyStatus {
    Active,
    Claimed,
    Expired,
}

/// At most one status transition; terminal once `Claimed` or `Expired`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bounty {
    pub id: BountyId,
    pub target_agent_id: AgentId,
    pub placed_by_agent_id: AgentId,
    pub amount: Amount,
    pub status: BountyStatus,
    pub claimed_by_agent_id: Option<AgentId>,
    pub created_at: DateTime<Utc>,
    pub created_at_tick: Tick,
    pub expires_at: Tick,
}

impl Bounty {
    pub fn is_active(&self, tick: Tick) -> bool {
        self.status == BountyStatus::Active && self.expires_at > tick
    }
}
