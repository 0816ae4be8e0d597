//! Agent entity: identity, resources, and the status machine (spec §3, §4.3).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use clawcity_types::{AgentId, Amount, BusinessId, GangId, ItemId, PropertyId, Tick, VehicleId, ZoneId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Busy,
    Jailed,
    Hospitalized,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skills {
    pub driving: u8,
    pub negotiation: u8,
    pub stealth: u8,
    pub combat: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentStats {
    pub jobs_completed: u64,
    pub crimes_committed: u64,
    pub coop_crimes_completed: u64,
    pub kills: u64,
    pub arrests: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// SHA-256 of the bearer key presented at registration.
    pub agent_key_hash: String,
    pub name: String,
    pub is_npc: bool,
    pub created_at: DateTime<Utc>,

    pub location_zone_id: ZoneId,

    pub cash: Amount,
    pub health: i32,
    pub stamina: i32,
    pub reputation: i64,
    pub heat: i32,

    pub status: AgentStatus,
    pub busy_until_tick: Option<Tick>,
    pub busy_action: Option<String>,
    /// Release tick for `Jailed`/`Hospitalized` sentences. Kept separate from
    /// `busy_until_tick`, which is reserved for `Busy` (spec §8 invariant 2).
    pub release_tick: Option<Tick>,

    pub inventory: HashMap<ItemId, u64>,
    pub skills: Skills,
    pub stats: AgentStats,

    pub gang_id: Option<GangId>,
    pub home_property_id: Option<PropertyId>,
    pub vehicle_id: Option<VehicleId>,
    pub gang_ban_until_tick: Option<Tick>,

    pub tax_owed: Amount,
    pub banned_at: Option<DateTime<Utc>>,

    /// Tick at which this agent's `busy_action` started, for NPC pacing and
    /// display only — not part of any invariant.
    pub last_action_tick: Tick,

    /// Who last killed this agent via `ATTACK_AGENT`, and when — the only
    /// evidence `CLAIM_BOUNTY` has to verify "target killed by claimer after
    /// bounty creation" (spec §4.2).
    pub last_killed_by: Option<AgentId>,
    pub last_killed_at_tick: Option<Tick>,
}

impl Agent {
    /// Clamp heat into `[0, max_heat]`. Every write path to `heat` must route
    /// through this so the bound in spec §8 invariant 5 always holds.
    pub fn adjust_heat(&mut self, delta: i32, max_heat: i32) {
        self.heat = (self.heat + delta).clamp(0, max_heat);
    }

    pub fn adjust_health(&mut self, delta: i32) {
        self.health = (self.health + delta).clamp(0, 100);
    }

    pub fn adjust_stamina(&mut self, delta: i32) {
        self.stamina = (self.stamina + delta).clamp(0, 100);
    }

    pub fn is_banned(&self) -> bool {
        self.banned_at.is_some()
    }

    /// Status consistency invariant (spec §8 invariant 2):
    /// `status == Busy` iff `busy_until_tick` is set and in the future.
    pub fn set_busy(&mut self, action: impl Into<String>, until_tick: Tick) {
        self.status = AgentStatus::Busy;
        self.busy_action = Some(action.into());
        self.busy_until_tick = Some(until_tick);
    }

    pub fn clear_busy_to_idle(&mut self) {
        self.status = AgentStatus::Idle;
        self.busy_action = None;
        self.busy_until_tick = None;
        self.release_tick = None;
    }

    /// Enter `Jailed`/`Hospitalized` with a release timer. `busy_until_tick`
    /// and `busy_action` stay null, since only `Busy` owns those fields.
    pub fn enter_timed_status(&mut self, status: AgentStatus, release_tick: Tick) {
        debug_assert!(matches!(status, AgentStatus::Jailed | AgentStatus::Hospitalized));
        self.status = status;
        self.busy_action = None;
        self.busy_until_tick = None;
        self.release_tick = Some(release_tick);
    }

    pub fn add_item(&mut self, item_id: ItemId, qty: u64) {
        *self.inventory.entry(item_id).or_insert(0) += qty;
    }

    /// Remove `qty` of an item. Returns `false` (no-op) if the agent does
    /// not hold enough. Removing the last copy drops the entry entirely, per
    /// spec §3's inventory invariant.
    pub fn remove_item(&mut self, item_id: &ItemId, qty: u64) -> bool {
        match self.inventory.get_mut(item_id) {
            Some(have) if *have >= qty => {
                *have -= qty;
                if *have == 0 {
                    self.inventory.remove(item_id);
                }
                true
            }
            _ => false,
        }
    }
}
