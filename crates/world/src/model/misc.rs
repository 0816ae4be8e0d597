//! Vehicles, disguises, contracts, and messages (spec §3, §4.2).

use chrono::{DateTime, Utc};
use clawcity_types::{AgentId, ContractId, DisguiseId, MessageId, Tick, VehicleId, ZoneId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub owner_agent_id: Option<AgentId>,
    pub zone_id: ZoneId,
    pub speed_bonus_pct: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disguise {
    pub id: DisguiseId,
    pub owner_agent_id: AgentId,
    pub name: String,
    /// Extra per-tick heat decay bonus while worn (spec §4.1 phase 3).
    pub heat_decay_bonus: i32,
    pub expires_at_tick: Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Offered,
    Accepted,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub offered_by_agent_id: AgentId,
    pub accepted_by_agent_id: Option<AgentId>,
    pub description: String,
    pub payout: rust_decimal::Decimal,
    pub status: ContractStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from_agent_id: AgentId,
    pub to_agent_id: AgentId,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub sent_at_tick: Tick,
}
