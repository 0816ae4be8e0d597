//! The fourteen-phase per-tick pipeline (spec §4.1), run once per fire of
//! `TickScheduler`.
//!
//! Phases 1–11 run under a single world write guard, so the tick is one
//! transaction as far as any reader is concerned. Phase 12 (the NPC step)
//! deliberately steps outside that guard and dispatches each NPC action
//! through the normal per-action lock path — it cannot hold the guard itself
//! without deadlocking against the dispatcher it is calling into. Phases
//! 13–14 reacquire the guard.

use chrono::Utc;
use clawcity_dispatcher::context::DispatchContext;
use clawcity_dispatcher::handlers::{coop, movement};
use clawcity_dispatcher::helpers::roll_bernoulli;
use clawcity_dispatcher::npc::{run_npc_step, NpcPolicy, NpcView};
use clawcity_dispatcher::tables::{ARREST_FINE, ARREST_SENTENCE_TICKS};
use clawcity_ledger::{EntryKind, EventType};
use clawcity_types::{AgentId, BountyId, CoopActionId, DisguiseId, PropertyId, Tick, ZoneId};
use clawcity_world::model::{AgentStatus, BountyStatus, CoopStatus, PendingCompletion};
use clawcity_world::store::WorldData;
use rust_decimal::Decimal;
use serde_json::json;

/// Per-tick counters surfaced on `TICK_COMPLETED` (spec §4.1 phase 14).
#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
pub struct TickCounters {
    pub resolved: u64,
    pub arrests: u64,
    pub territory_income: u64,
    pub rent_payments: u64,
    pub coop_executed: u64,
}

/// Run one full tick and return its counters.
pub async fn run_tick(ctx: &DispatchContext, policy: &dyn NpcPolicy) -> TickCounters {
    let mut counters = TickCounters::default();

    let tick = {
        let mut world = ctx.store.write().await;
        let tick = phase_1_advance(&mut world, Utc::now());
        counters.resolved = phase_2_resolve_busy(&mut world, tick);
        phase_3_heat_decay(&mut world, tick);
        counters.arrests = phase_4_arrest_checks(&mut world, tick);
        phase_5_release(&mut world, tick);
        counters.territory_income = phase_6_territory_income(&mut world, tick);
        counters.rent_payments = phase_7_rent_payments(&mut world, tick);
        counters.coop_executed = phase_8_coop_actions(&mut world, tick);
        phase_9_bounty_expiry(&mut world, tick);
        phase_10_disguise_expiry(&mut world, tick);
        phase_11_friendship_decay(&mut world, tick);
        tick
    };

    phase_12_npc_step(ctx, policy, tick).await;

    {
        let mut world = ctx.store.write().await;
        phase_13_summary_refresh(&mut world);
        phase_14_emit_tick_completed(&mut world, counters);
    }

    counters
}

fn phase_1_advance(world: &mut WorldData, now: chrono::DateTime<Utc>) -> Tick {
    world.singleton.as_mut().expect("singleton initialized at startup").advance(now)
}

/// Resolve every agent whose `busyUntilTick` has arrived, except coop
/// rendezvous participants — those stay queued for phase 8, which owns the
/// coop action's atomic settlement.
fn phase_2_resolve_busy(world: &mut WorldData, tick: Tick) -> u64 {
    let due: Vec<AgentId> = world
        .agents
        .values()
        .filter(|a| a.status == AgentStatus::Busy && a.busy_until_tick.map(|t| t <= tick).unwrap_or(false))
        .map(|a| a.id)
        .collect();

    let mut resolved = 0u64;
    for agent_id in due {
        if matches!(world.pending_completions.get(&agent_id), Some(PendingCompletion::CoopRendezvous { .. })) {
            continue;
        }
        let completion = world.take_pending_completion(agent_id).unwrap_or(PendingCompletion::None);
        match completion {
            PendingCompletion::Move { to_zone_id } => movement::complete_move(world, agent_id, to_zone_id),
            PendingCompletion::TakeJob { job_id } => movement::complete_take_job(world, agent_id, job_id),
            PendingCompletion::Heal => movement::complete_heal(world, agent_id),
            PendingCompletion::Rest => movement::complete_rest(world, agent_id),
            PendingCompletion::CoopRendezvous { .. } | PendingCompletion::None => {}
        }
        if let Some(agent) = world.agents.get_mut(&agent_id) {
            if agent.status == AgentStatus::Busy {
                agent.clear_busy_to_idle();
            }
        }
        resolved += 1;
    }
    resolved
}

/// Subtract idle/busy heat decay, scaled by safehouse, gang-controlled zone,
/// and active-disguise multipliers (spec §4.1 phase 3).
fn phase_3_heat_decay(world: &mut WorldData, tick: Tick) {
    let max_heat = world.config().max_heat;
    let idle_decay = world.config().heat_decay_idle;
    let busy_decay = world.config().heat_decay_busy;

    let agent_ids: Vec<AgentId> = world.agents.keys().copied().collect();
    for agent_id in agent_ids {
        let agent = &world.agents[&agent_id];
        if agent.is_banned() {
            continue;
        }
        let base = if agent.status == AgentStatus::Idle { idle_decay } else { busy_decay };

        let has_safehouse = agent
            .home_property_id
            .and_then(|pid| world.properties.get(&pid))
            .map(|p| p.is_safehouse && p.zone_id == agent.location_zone_id)
            .unwrap_or(false);
        let in_gang_zone = agent
            .gang_id
            .zip(world.territories.get(&agent.location_zone_id))
            .map(|(gang_id, territory)| territory.gang_id == gang_id)
            .unwrap_or(false);
        let disguise_bonus = world
            .disguises
            .values()
            .find(|d| d.owner_agent_id == agent_id && d.expires_at_tick > tick)
            .map(|d| d.heat_decay_bonus)
            .unwrap_or(0);

        let mut decay = base as f64;
        if has_safehouse {
            decay *= 1.5;
        }
        if in_gang_zone {
            decay *= 1.2;
        }
        let decay = decay.round() as i32 + disguise_bonus;

        world.agents.get_mut(&agent_id).unwrap().adjust_heat(-decay, max_heat);
    }
}

/// Bernoulli arrest roll on every agent at or above the heat threshold (spec
/// §4.1 phase 4). On success: jail, fine (partial + tax-owed shortfall).
fn phase_4_arrest_checks(world: &mut WorldData, tick: Tick) -> u64 {
    let threshold = world.config().arrest_threshold_heat;
    let heat_weight = world.config().arrest_heat_weight;
    let police_weight = world.config().arrest_police_weight;
    let max_heat = world.config().max_heat;

    let candidates: Vec<AgentId> = world
        .agents
        .values()
        .filter(|a| !a.is_banned() && a.status != AgentStatus::Jailed && a.heat >= threshold)
        .map(|a| a.id)
        .collect();

    let mut arrests = 0u64;
    for agent_id in candidates {
        let (heat, zone_id) = {
            let a = &world.agents[&agent_id];
            (a.heat, a.location_zone_id.clone())
        };
        let police_presence = world.zones.get(&zone_id).map(|z| z.police_presence).unwrap_or(0.0);
        let p = (heat_weight * (heat as f32 / max_heat as f32) + police_weight * police_presence).clamp(0.0, 1.0);
        if !roll_bernoulli(p as f64) {
            continue;
        }

        let cash = world.agents[&agent_id].cash;
        let fine = ARREST_FINE.min(cash);
        if fine > Decimal::ZERO {
            let _ = world.post_ledger(agent_id, EntryKind::Debit, fine, "arrest_fine", None);
        }
        let shortfall = ARREST_FINE - fine;

        let agent = world.agents.get_mut(&agent_id).unwrap();
        agent.enter_timed_status(AgentStatus::Jailed, tick + ARREST_SENTENCE_TICKS);
        agent.tax_owed += shortfall;
        agent.stats.arrests += 1;

        world.emit_simple(EventType::AgentArrested, agent_id);
        arrests += 1;
    }
    arrests
}

/// Release any jailed/hospitalized agent whose release tick has arrived
/// (spec §4.1 phase 5). Natural hospital discharge also restores health.
fn phase_5_release(world: &mut WorldData, tick: Tick) {
    let due: Vec<(AgentId, AgentStatus)> = world
        .agents
        .values()
        .filter(|a| matches!(a.status, AgentStatus::Jailed | AgentStatus::Hospitalized))
        .filter(|a| a.release_tick.map(|t| t <= tick).unwrap_or(false))
        .map(|a| (a.id, a.status))
        .collect();

    for (agent_id, status) in due {
        if let Some(agent) = world.agents.get_mut(&agent_id) {
            agent.clear_busy_to_idle();
            if status == AgentStatus::Hospitalized {
                agent.health = 100;
            }
        }
        world.take_pending_completion(agent_id);
        let event = if status == AgentStatus::Jailed { EventType::JailReleased } else { EventType::HospitalDischarged };
        world.emit_simple(event, agent_id);
    }
}

/// A territory with no gang member present for this many ticks starts
/// losing `controlStrength` (spec §4.1 phase 6's "no gang member visited").
const TERRITORY_DECAY_GRACE_TICKS: u64 = 50;
const TERRITORY_DECAY_PER_TICK: i32 = 5;

fn phase_6_territory_income(world: &mut WorldData, tick: Tick) -> u64 {
    let zone_ids: Vec<ZoneId> = world.territories.keys().cloned().collect();
    let mut payments = 0u64;
    let mut lost = Vec::new();

    for zone_id in zone_ids {
        let (gang_id, income) = {
            let t = &world.territories[&zone_id];
            (t.gang_id, t.income_per_tick)
        };
        let leader_id = world.gangs.get(&gang_id).map(|g| g.leader_id);

        if let Some(gang) = world.gangs.get_mut(&gang_id) {
            gang.treasury += income;
            payments += 1;
        }
        if let Some(leader_id) = leader_id {
            world.emit_with_payload(
                EventType::TerritoryIncome,
                leader_id,
                json!({ "zoneId": zone_id, "gangId": gang_id, "amount": income }),
            );
        }

        let gang_present = world
            .agents_by_zone
            .get(&zone_id)
            .map(|agents| agents.iter().any(|id| world.agents.get(id).map(|a| a.gang_id == Some(gang_id)).unwrap_or(false)))
            .unwrap_or(false);

        let territory = world.territories.get_mut(&zone_id).unwrap();
        if gang_present {
            territory.last_defended_tick = tick;
        } else if tick.saturating_sub(territory.last_defended_tick) > TERRITORY_DECAY_GRACE_TICKS {
            territory.decay(TERRITORY_DECAY_PER_TICK);
        }
        if territory.is_lost() {
            lost.push((zone_id.clone(), leader_id));
        }
    }

    for (zone_id, leader_id) in lost {
        if let Some(t) = world.territories.remove(&zone_id) {
            if let Some(leader_id) = leader_id {
                world.emit_with_payload(EventType::TerritoryLost, leader_id, json!({ "zoneId": zone_id, "gangId": t.gang_id }));
            }
        }
    }

    payments
}

fn phase_7_rent_payments(world: &mut WorldData, tick: Tick) -> u64 {
    let due: Vec<PropertyId> = world
        .property_residents
        .values()
        .filter(|r| r.rent_due_at <= tick)
        .map(|r| r.property_id)
        .collect();

    let mut payments = 0u64;
    for property_id in due {
        let Some(resident) = world.property_residents.get(&property_id).cloned() else { continue };
        let Some(property) = world.properties.get(&property_id).cloned() else { continue };

        let tenant_cash = world.agents.get(&resident.tenant_agent_id).map(|a| a.cash).unwrap_or(Decimal::ZERO);
        if tenant_cash < property.rent_per_period {
            world.property_residents.remove(&property_id);
            if let Some(agent) = world.agents.get_mut(&resident.tenant_agent_id) {
                if agent.home_property_id == Some(property_id) {
                    agent.home_property_id = None;
                }
            }
            world.emit_with_payload(EventType::TenantEvicted, resident.tenant_agent_id, json!({ "propertyId": property_id }));
            continue;
        }

        let _ = world.post_ledger(resident.tenant_agent_id, EntryKind::Debit, property.rent_per_period, "rent_payment", None);
        if let Some(owner_id) = property.owner_agent_id {
            let _ = world.post_ledger(owner_id, EntryKind::Credit, property.rent_per_period, "rent_income", None);
        }

        if let Some(resident) = world.property_residents.get_mut(&property_id) {
            resident.rent_due_at = tick + property.rent_period_ticks;
        }
        payments += 1;
    }
    payments
}

fn phase_8_coop_actions(world: &mut WorldData, tick: Tick) -> u64 {
    let ids: Vec<CoopActionId> = world.coop_actions.keys().copied().collect();
    let mut executed = 0u64;
    for coop_action_id in ids {
        let (status, expires_at, execute_at) = {
            let c = &world.coop_actions[&coop_action_id];
            (c.status, c.expires_at, c.execute_at)
        };
        match status {
            CoopStatus::Recruiting if expires_at <= tick => coop::cancel_expired(world, coop_action_id),
            CoopStatus::Ready if execute_at.map(|e| e <= tick).unwrap_or(false) => {
                coop::execute(world, coop_action_id, tick);
                executed += 1;
            }
            _ => {}
        }
    }
    executed
}

fn phase_9_bounty_expiry(world: &mut WorldData, tick: Tick) {
    let ids: Vec<BountyId> = world
        .bounties
        .values()
        .filter(|b| b.status == BountyStatus::Active && b.expires_at <= tick)
        .map(|b| b.id)
        .collect();

    for bounty_id in ids {
        let Some(bounty) = world.bounties.get(&bounty_id).cloned() else { continue };
        let refund = (bounty.amount * Decimal::from(50) / Decimal::from(100)).round_dp(2);
        let _ = world.post_ledger(bounty.placed_by_agent_id, EntryKind::Credit, refund, "bounty_refund", None);

        world.bounties.get_mut(&bounty_id).unwrap().status = BountyStatus::Expired;
        world.emit_with_payload(EventType::BountyExpired, bounty.placed_by_agent_id, json!({ "bountyId": bounty_id, "refund": refund }));
    }
}

fn phase_10_disguise_expiry(world: &mut WorldData, tick: Tick) {
    let ids: Vec<DisguiseId> = world.disguises.values().filter(|d| d.expires_at_tick <= tick).map(|d| d.id).collect();

    for disguise_id in ids {
        if let Some(d) = world.disguises.remove(&disguise_id) {
            world.emit_with_payload(EventType::DisguiseExpired, d.owner_agent_id, json!({ "disguiseId": disguise_id }));
        }
    }
}

const FRIENDSHIP_DECAY_THRESHOLD_TICKS: u64 = 100;

fn phase_11_friendship_decay(world: &mut WorldData, tick: Tick) {
    let decay = world.config().friendship_decay_per_tick;
    let keys: Vec<(AgentId, AgentId)> = world.friendships.keys().copied().collect();
    let mut removed = Vec::new();

    for key in keys {
        let f = world.friendships.get_mut(&key).unwrap();
        if tick.saturating_sub(f.last_interaction_tick) < FRIENDSHIP_DECAY_THRESHOLD_TICKS {
            continue;
        }
        f.strength = (f.strength - decay).max(0);
        f.loyalty = (f.loyalty - decay).max(0);
        if f.strength == 0 && f.loyalty == 0 {
            removed.push(key);
        }
    }

    for key in removed {
        world.friendships.remove(&key);
        if let Some(set) = world.friendships_by_agent.get_mut(&key.0) {
            set.remove(&key);
        }
        if let Some(set) = world.friendships_by_agent.get_mut(&key.1) {
            set.remove(&key);
        }
        world.emit_with_payload(EventType::FriendshipEnded, key.0, json!({ "otherAgentId": key.1 }));
    }
}

/// Ask every idle NPC due a decision for one action, and dispatch it through
/// the normal path with a synthesized `requestId` (spec §4.1 phase 12).
/// Failures are logged, never allowed to abort the tick.
async fn phase_12_npc_step(ctx: &DispatchContext, policy: &dyn NpcPolicy, tick: Tick) {
    let period = ctx.store.read().await.config().npc_decision_period_ticks;

    let due: Vec<NpcView> = {
        let world = ctx.store.read().await;
        world
            .agents
            .values()
            .filter(|a| a.is_npc && !a.is_banned() && a.status == AgentStatus::Idle)
            .filter(|a| a.last_action_tick + period <= tick)
            .map(|a| NpcView {
                agent_id: a.id,
                cash: a.cash,
                health: a.health,
                stamina: a.stamina,
                heat: a.heat,
                location_zone_id: a.location_zone_id.clone(),
            })
            .collect()
    };

    for view in due {
        let agent_id = view.agent_id;
        if let Some(result) = run_npc_step(ctx, policy, view, tick).await {
            if !result.ok {
                tracing::warn!(%agent_id, error = ?result.error, "npc step failed");
            }
            if let Some(agent) = ctx.store.write().await.agents.get_mut(&agent_id) {
                agent.last_action_tick = tick;
            }
        }
    }
}

/// Bounded, resumable sweep that self-heals the zone/gang denormalized
/// indexes against each agent's live fields (spec §4.1 phase 13).
const SUMMARY_WORK_BUDGET: usize = 200;

fn phase_13_summary_refresh(world: &mut WorldData) {
    let agent_ids: Vec<AgentId> = world.agents.keys().copied().collect();
    if agent_ids.is_empty() {
        return;
    }

    let start = (world.summary_cursor as usize) % agent_ids.len();
    let take = SUMMARY_WORK_BUDGET.min(agent_ids.len());

    for offset in 0..take {
        let agent_id = agent_ids[(start + offset) % agent_ids.len()];
        reconcile_zone_index(world, agent_id);
        reconcile_gang_index(world, agent_id);
    }

    world.summary_cursor = world.summary_cursor.wrapping_add(take as u64);
}

fn reconcile_zone_index(world: &mut WorldData, agent_id: AgentId) {
    let Some(zone_id) = world.agents.get(&agent_id).map(|a| a.location_zone_id.clone()) else { return };
    for (zid, set) in world.agents_by_zone.iter_mut() {
        if *zid != zone_id {
            set.remove(&agent_id);
        }
    }
    world.agents_by_zone.entry(zone_id).or_default().insert(agent_id);
}

fn reconcile_gang_index(world: &mut WorldData, agent_id: AgentId) {
    let Some(gang_id) = world.agents.get(&agent_id).map(|a| a.gang_id) else { return };
    for (gid, set) in world.agents_by_gang.iter_mut() {
        if Some(*gid) != gang_id {
            set.remove(&agent_id);
        }
    }
    if let Some(gang_id) = gang_id {
        world.agents_by_gang.entry(gang_id).or_default().insert(agent_id);
    }
}

fn phase_14_emit_tick_completed(world: &mut WorldData, counters: TickCounters) {
    tracing::info!(?counters, tick = world.tick(), "tick completed");
    world.emit(EventType::TickCompleted, |a| {
        a.payload(json!({
            "resolved": counters.resolved,
            "arrests": counters.arrests,
            "territoryIncome": counters.territory_income,
            "rentPayments": counters.rent_payments,
            "coopExecuted": counters.coop_executed,
        }))
    });
}
