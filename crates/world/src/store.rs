//! `WorldData`: the single in-memory document store, and `WorldStore`, its
//! `Arc<RwLock<_>>` handle.
//!
//! Grounded on `synapse::state::StateStore`'s `Arc<RwLock<HashMap<..>>>`
//! shape, generalized from one table to the full entity set named in spec
//! §3/§6. There is exactly one `WorldData` per process; every table it owns
//! is guarded by the same lock, which is the store's entire answer to the
//! "no client-visible parallelism beyond what canonical lock ordering
//! allows" requirement (spec §5) — `clawcity-kernel` layers named logical
//! locks on top of this for call sites that want to reason about ordering
//! explicitly, but correctness does not depend on it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use clawcity_ledger::{EmitArgs, EntryKind, EventLog, EventType, LedgerBook, LedgerError};
use clawcity_types::{
    AgentId, Amount, BountyId, BusinessId, ContractId, CoopActionId, DisguiseId, ErrorCode, EventId,
    GangId, ItemId, JobId, MessageId, PropertyId, Tick, VehicleId, ZoneId,
};
use serde_json::Value;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::config::WorldConfig;
use crate::model::{
    Agent, Bounty, Business, Contract, CoopAction, Disguise, Friendship, Gang, GangInvite, Item, Job,
    Message, PendingCompletion, Property, PropertyResident, Territory, Vehicle, Zone, ZoneEdge,
};
use crate::seed::SeedData;
use crate::singleton::WorldSingleton;

/// Every entity table and secondary index named in spec §6's persisted
/// state layout.
#[derive(Debug, Default)]
pub struct WorldData {
    pub singleton: Option<WorldSingleton>,

    pub agents: HashMap<AgentId, Agent>,
    pub agents_by_key_hash: HashMap<String, AgentId>,
    pub agents_by_zone: HashMap<ZoneId, HashSet<AgentId>>,
    pub agents_by_gang: HashMap<GangId, HashSet<AgentId>>,

    pub zones: HashMap<ZoneId, Zone>,
    pub zone_edges: Vec<ZoneEdge>,
    pub items: HashMap<ItemId, Item>,
    pub jobs: HashMap<JobId, Job>,
    pub businesses: HashMap<BusinessId, Business>,
    pub vehicles: HashMap<VehicleId, Vehicle>,
    pub properties: HashMap<PropertyId, Property>,
    pub property_residents: HashMap<PropertyId, PropertyResident>,
    pub disguises: HashMap<DisguiseId, Disguise>,

    pub gangs: HashMap<GangId, Gang>,
    pub gang_invites: HashMap<Uuid, GangInvite>,
    pub territories: HashMap<ZoneId, Territory>,

    pub friendships: HashMap<(AgentId, AgentId), Friendship>,
    pub friendships_by_agent: HashMap<AgentId, HashSet<(AgentId, AgentId)>>,

    pub bounties: HashMap<BountyId, Bounty>,
    pub bounties_by_target: HashMap<AgentId, HashSet<BountyId>>,

    pub coop_actions: HashMap<CoopActionId, CoopAction>,
    pub coop_actions_by_zone: HashMap<ZoneId, HashSet<CoopActionId>>,

    pub contracts: HashMap<ContractId, Contract>,
    pub messages: HashMap<MessageId, Message>,

    /// Structured completion effect for every agent currently `busy`,
    /// consumed by tick pipeline phase 2.
    pub pending_completions: HashMap<AgentId, PendingCompletion>,

    pub ledger: LedgerBook,
    pub events: EventLog,

    /// Resume point for phase 13's bounded denormalized-index sweep (spec
    /// §4.1 phase 13). An index into the agent id set, wrapping.
    pub summary_cursor: u64,
}

/// Uniform draw over a `Decimal` range at cent precision, used for a new
/// agent's starting cash.
fn rand_decimal_range(lo: Amount, hi: Amount) -> Amount {
    use rand::Rng;
    let lo_cents: i64 = (lo * rust_decimal::Decimal::ONE_HUNDRED).round().try_into().unwrap_or(0);
    let hi_cents: i64 = (hi * rust_decimal::Decimal::ONE_HUNDRED).round().try_into().unwrap_or(0);
    let cents = if hi_cents > lo_cents { rand::rng().random_range(lo_cents..=hi_cents) } else { lo_cents };
    Amount::new(cents, 2)
}

impl WorldData {
    /// Build a fresh store from the bundled seed catalog (spec §1
    /// Out-of-scope: seed data is read-only reference loaded at startup).
    pub fn seeded(config: WorldConfig, seed: u64) -> Self {
        let data = SeedData::bundled();
        let mut world = WorldData::default();
        world.singleton = Some(WorldSingleton::new(seed, config));

        for zone in data.zones {
            world.zones.insert(zone.slug.clone(), zone);
        }
        world.zone_edges = data.zone_edges;
        for item in data.items {
            world.items.insert(item.id.clone(), item);
        }
        for job in data.jobs {
            world.jobs.insert(job.id.clone(), job);
        }
        for business in data.businesses {
            world.businesses.insert(business.id, business);
        }
        for vehicle in data.vehicles {
            world.vehicles.insert(vehicle.id, vehicle);
        }
        for property in data.properties {
            world.properties.insert(property.id, property);
        }
        world
    }

    pub fn tick(&self) -> Tick {
        self.singleton.as_ref().map(|s| s.tick).unwrap_or(0)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.singleton.as_ref().expect("singleton initialized at startup").config
    }

    // ----- agent lifecycle -------------------------------------------------

    /// Register a brand-new agent from `POST /agent/register` (spec §4.2,
    /// §6): draws a uniform starting cash, places it in the configured
    /// starting zone, and records the hash of the bearer key the caller
    /// presented at registration. Returns the new agent so the caller can
    /// read back its id.
    pub fn register_agent(&mut self, name: String, agent_key_hash: String, is_npc: bool) -> AgentId {
        let config = self.config();
        let cash = rand_decimal_range(config.starting_cash_min, config.starting_cash_max);
        let starting_zone_id = config.starting_zone_id.clone();
        let now = chrono::Utc::now();
        let tick = self.tick();

        let agent = Agent {
            id: Uuid::new_v4(),
            agent_key_hash,
            name,
            is_npc,
            created_at: now,
            location_zone_id: starting_zone_id,
            cash: Amount::ZERO,
            health: 100,
            stamina: 100,
            reputation: 0,
            heat: 0,
            status: crate::model::AgentStatus::Idle,
            busy_until_tick: None,
            busy_action: None,
            release_tick: None,
            inventory: HashMap::new(),
            skills: Default::default(),
            stats: Default::default(),
            gang_id: None,
            home_property_id: None,
            vehicle_id: None,
            gang_ban_until_tick: None,
            tax_owed: Amount::ZERO,
            banned_at: None,
            last_action_tick: tick,
            last_killed_by: None,
            last_killed_at_tick: None,
        };
        let agent_id = agent.id;
        self.insert_agent(agent);
        self.post_ledger(agent_id, EntryKind::Credit, cash, "starting_cash", None).ok();
        self.emit_simple(EventType::AgentRegistered, agent_id);
        agent_id
    }

    pub fn insert_agent(&mut self, agent: Agent) {
        self.agents_by_key_hash.insert(agent.agent_key_hash.clone(), agent.id);
        self.agents_by_zone.entry(agent.location_zone_id.clone()).or_default().insert(agent.id);
        if let Some(gang_id) = agent.gang_id {
            self.agents_by_gang.entry(gang_id).or_default().insert(agent.id);
        }
        self.agents.insert(agent.id, agent);
    }

    pub fn agent_by_key_hash(&self, key_hash: &str) -> Option<&Agent> {
        self.agents_by_key_hash.get(key_hash).and_then(|id| self.agents.get(id))
    }

    /// Move an agent between zones, keeping `agents_by_zone` consistent.
    /// Callers must have already validated the edge/precondition.
    pub fn relocate_agent(&mut self, agent_id: AgentId, to_zone: ZoneId) -> Result<(), ErrorCode> {
        let agent = self.agents.get_mut(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
        let from_zone = agent.location_zone_id.clone();
        agent.location_zone_id = to_zone.clone();
        if let Some(set) = self.agents_by_zone.get_mut(&from_zone) {
            set.remove(&agent_id);
        }
        self.agents_by_zone.entry(to_zone).or_default().insert(agent_id);
        Ok(())
    }

    /// Reassign an agent's gang, keeping `agents_by_gang` consistent.
    pub fn set_agent_gang(&mut self, agent_id: AgentId, gang_id: Option<GangId>) -> Result<(), ErrorCode> {
        let agent = self.agents.get_mut(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
        if let Some(old_gang) = agent.gang_id {
            if let Some(set) = self.agents_by_gang.get_mut(&old_gang) {
                set.remove(&agent_id);
            }
        }
        agent.gang_id = gang_id;
        if let Some(new_gang) = gang_id {
            self.agents_by_gang.entry(new_gang).or_default().insert(agent_id);
        }
        Ok(())
    }

    /// Mark an agent busy and record the structured completion effect the
    /// tick pipeline must apply once `until_tick` is reached.
    pub fn set_busy(
        &mut self,
        agent_id: AgentId,
        action: impl Into<String>,
        until_tick: Tick,
        completion: PendingCompletion,
    ) -> Result<(), ErrorCode> {
        let agent = self.agents.get_mut(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
        agent.set_busy(action, until_tick);
        self.pending_completions.insert(agent_id, completion);
        Ok(())
    }

    /// Remove and return the queued completion for an agent resolved by the
    /// tick pipeline; `None` for agents that never had one recorded (e.g.
    /// released directly by an arrest or jailbreak penalty).
    pub fn take_pending_completion(&mut self, agent_id: AgentId) -> Option<PendingCompletion> {
        self.pending_completions.remove(&agent_id)
    }

    // ----- ledger / events --------------------------------------------------

    /// The only path by which cash moves (spec §4.5). Keeps `agent.cash` and
    /// the ledger's reconstructable balance in lockstep.
    pub fn post_ledger(
        &mut self,
        agent_id: AgentId,
        kind: EntryKind,
        amount: Amount,
        reason: impl Into<String>,
        ref_event_id: Option<EventId>,
    ) -> Result<Amount, LedgerError> {
        let tick = self.tick();
        let current_cash = self
            .agents
            .get(&agent_id)
            .map(|a| a.cash)
            .unwrap_or(Amount::ZERO);
        let balance = self.ledger.post(agent_id, tick, current_cash, kind, amount, reason, ref_event_id)?;
        if let Some(agent) = self.agents.get_mut(&agent_id) {
            agent.cash = balance;
        }
        Ok(balance)
    }

    pub fn emit(&mut self, event_type: EventType, build: impl FnOnce(EmitArgs) -> EmitArgs) -> EventId {
        let tick = self.tick();
        let args = build(EmitArgs::new(tick, event_type));
        self.events.emit(args)
    }

    pub fn emit_simple(&mut self, event_type: EventType, agent_id: AgentId) -> EventId {
        self.emit(event_type, |a| a.agent(agent_id))
    }

    pub fn emit_with_payload(&mut self, event_type: EventType, agent_id: AgentId, payload: Value) -> EventId {
        self.emit(event_type, |a| a.agent(agent_id).payload(payload))
    }

    // ----- friendships -------------------------------------------------------

    pub fn upsert_friendship(&mut self, friendship: Friendship) {
        let key = friendship.key();
        self.friendships_by_agent.entry(key.0).or_default().insert(key);
        self.friendships_by_agent.entry(key.1).or_default().insert(key);
        self.friendships.insert(key, friendship);
    }

    // ----- bounties ------------------------------------------------------------

    pub fn insert_bounty(&mut self, bounty: Bounty) {
        self.bounties_by_target.entry(bounty.target_agent_id).or_default().insert(bounty.id);
        self.bounties.insert(bounty.id, bounty);
    }

    // ----- coop actions ----------------------------------------------------------

    pub fn insert_coop_action(&mut self, coop: CoopAction) {
        self.coop_actions_by_zone.entry(coop.zone_id.clone()).or_default().insert(coop.id);
        self.coop_actions.insert(coop.id, coop);
    }
}

/// Shared, lock-guarded handle to the world's single document store.
#[derive(Clone)]
pub struct WorldStore {
    inner: Arc<RwLock<WorldData>>,
}

impl WorldStore {
    pub fn seeded(config: WorldConfig, seed: u64) -> Self {
        Self { inner: Arc::new(RwLock::new(WorldData::seeded(config, seed))) }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, WorldData> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, WorldData> {
        self.inner.write().await
    }
}
