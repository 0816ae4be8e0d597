//! Zone reference data and the zone graph (spec §3).

use clawcity_types::ZoneId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    Residential,
    Market,
    Industrial,
    Hospital,
    Government,
    Hotzone,
    Docks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub slug: ZoneId,
    pub name: String,
    pub zone_type: ZoneType,
    pub description: String,
    pub map_x: Option<f32>,
    pub map_y: Option<f32>,
    /// Baseline law-enforcement presence in `[0,1]`, used by arrest checks,
    /// crime success, and coop-crime success formulas.
    pub police_presence: f32,
}

/// A directed edge in the zone travel graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneEdge {
    pub from: ZoneId,
    pub to: ZoneId,
    pub time_cost_ticks: u64,
    pub cash_cost: rust_decimal::Decimal,
    /// Probability in `[0,1]` of a heat gain while traversing this edge.
    pub heat_risk: f32,
}
