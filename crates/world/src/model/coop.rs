//! Cooperative action engine entity and state machine (spec §4.4).

use chrono::{DateTime, Utc};
use clawcity_types::{AgentId, CoopActionId, Tick, ZoneId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoopActionType {
    CoopRobbery,
    CoopHeist,
    CoopSmuggling,
}

impl CoopActionType {
    /// Base loot before the 1.5x success multiplier and per-participant
    /// split (spec §4.4).
    pub fn base_loot(self) -> rust_decimal::Decimal {
        use rust_decimal_macros::dec;
        match self {
            CoopActionType::CoopRobbery => dec!(400),
            CoopActionType::CoopHeist => dec!(1200),
            CoopActionType::CoopSmuggling => dec!(800),
        }
    }

    pub fn heat_of(self) -> i32 {
        match self {
            CoopActionType::CoopRobbery => 20,
            CoopActionType::CoopHeist => 35,
            CoopActionType::CoopSmuggling => 15,
        }
    }

    pub fn damage_range(self) -> (i32, i32) {
        match self {
            CoopActionType::CoopRobbery => (10, 25),
            CoopActionType::CoopHeist => (15, 35),
            CoopActionType::CoopSmuggling => (5, 15),
        }
    }

    /// `Agent.busy_action` tag while participants await execution
    /// (spec §4.4: `busyAction="coop_<type>"`).
    pub fn busy_tag(self) -> &'static str {
        match self {
            CoopActionType::CoopRobbery => "coop_robbery",
            CoopActionType::CoopHeist => "coop_heist",
            CoopActionType::CoopSmuggling => "coop_smuggling",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoopStatus {
    Recruiting,
    Ready,
    Executing,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoopResult {
    pub success: bool,
    pub loot_per_participant: Option<rust_decimal::Decimal>,
    pub heat_per_participant: i32,
    pub damage_per_participant: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoopAction {
    pub id: CoopActionId,
    pub initiator_id: AgentId,
    pub action_type: CoopActionType,
    pub zone_id: ZoneId,
    pub status: CoopStatus,
    /// Ordered set of participants (initiator included); `Vec` preserves
    /// join order for deterministic payout splitting.
    pub participant_ids: Vec<AgentId>,
    pub min_participants: usize,
    pub max_participants: usize,
    pub created_at: DateTime<Utc>,
    pub expires_at: Tick,
    pub execute_at: Option<Tick>,
    pub result: Option<CoopResult>,
}

impl CoopAction {
    pub fn is_full(&self) -> bool {
        self.participant_ids.len() >= self.max_participants
    }

    pub fn meets_minimum(&self) -> bool {
        self.participant_ids.len() >= self.min_participants
    }

    pub fn contains(&self, agent_id: AgentId) -> bool {
        self.participant_ids.contains(&agent_id)
    }
}
