//! Property ownership and rent (spec §3).

use clawcity_types::{AgentId, Amount, PropertyId, Tick, ZoneId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub zone_id: ZoneId,
    pub name: String,
    pub price: Amount,
    pub rent_per_period: Amount,
    pub rent_period_ticks: u64,
    pub owner_agent_id: Option<AgentId>,
    /// `true` for properties that back a home safehouse discount on heat
    /// decay (spec §4.1 phase 3).
    pub is_safehouse: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyResident {
    pub property_id: PropertyId,
    pub tenant_agent_id: AgentId,
    pub rent_due_at: Tick,
}
