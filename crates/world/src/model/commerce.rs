//! Item, job, and business reference/mutable data (spec §3).

use std::collections::HashMap;

use clawcity_types::{Amount, BusinessId, ItemId, JobId, ZoneId};
use serde::{Deserialize, Serialize};

/// Static reference data describing a usable/tradeable item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub base_price: Amount,
    pub health_delta: i32,
    pub stamina_delta: i32,
    pub heat_delta: i32,
}

/// Static reference data describing a job offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub zone_id: ZoneId,
    pub name: String,
    pub wage: Amount,
    pub duration_ticks: u64,
    pub stamina_cost: i32,
    pub reputation_required: i64,
    pub skill_required: Option<(String, u8)>,
}

/// A `(quantity on hand, unit price)` pair for one item carried by a business.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StockEntry {
    pub qty: u64,
    pub price: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    pub zone_id: ZoneId,
    pub cash_on_hand: Amount,
    pub inventory: HashMap<ItemId, StockEntry>,
    pub owner_agent_id: Option<clawcity_types::AgentId>,
}
