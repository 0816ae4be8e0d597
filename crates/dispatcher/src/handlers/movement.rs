//! `MOVE`, `TAKE_JOB`, `HEAL`, `REST`, `USE_ITEM` (spec §4.2).

use clawcity_ledger::{EntryKind, EventType};
use clawcity_types::{AgentId, ErrorCode, ItemId, JobId, ZoneId};
use clawcity_world::store::WorldData;
use clawcity_world::model::{AgentStatus, PendingCompletion, ZoneType};
use rust_decimal::Decimal;
use serde_json::json;

use crate::helpers::{rand_i32, roll_bernoulli};
use crate::tables::{HEAL_COST_PER_HP, HEAL_MAX_TICKS, HEAL_MIN_TICKS, MOVE_HEAT_ON_RISK, REST_DURATION_TICKS};

pub fn handle_move(world: &mut WorldData, agent_id: AgentId, to_zone: ZoneId) -> Result<serde_json::Value, ErrorCode> {
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    let from_zone = agent.location_zone_id.clone();

    let edge = world
        .zone_edges
        .iter()
        .find(|e| e.from == from_zone && e.to == to_zone)
        .cloned()
        .ok_or(ErrorCode::PreconditionFailed)?;

    world.post_ledger(agent_id, EntryKind::Debit, edge.cash_cost, "move_cost", None).map_err(|_| ErrorCode::InsufficientFunds)?;

    let tick = world.tick();
    let until_tick = tick + edge.time_cost_ticks;
    world.set_busy(agent_id, "move", until_tick, PendingCompletion::Move { to_zone_id: edge.to.clone() })?;

    if roll_bernoulli(edge.heat_risk as f64) {
        let max_heat = world.config().max_heat;
        world.agents.get_mut(&agent_id).unwrap().adjust_heat(MOVE_HEAT_ON_RISK, max_heat);
    }

    Ok(json!({ "busyUntilTick": until_tick, "toZone": to_zone }))
}

/// Applies the queued `Move` effect once `busyUntilTick` is reached
/// (tick pipeline phase 2).
pub fn complete_move(world: &mut WorldData, agent_id: AgentId, to_zone_id: ZoneId) {
    let _ = world.relocate_agent(agent_id, to_zone_id.clone());
    world.emit_with_payload(EventType::MoveCompleted, agent_id, json!({ "zoneId": to_zone_id }));
}

pub fn handle_take_job(world: &mut WorldData, agent_id: AgentId, job_id: JobId) -> Result<serde_json::Value, ErrorCode> {
    let job = world.jobs.get(&job_id).cloned().ok_or(ErrorCode::PreconditionFailed)?;
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;

    if agent.location_zone_id != job.zone_id {
        return Err(ErrorCode::PreconditionFailed);
    }
    if agent.reputation < job.reputation_required {
        return Err(ErrorCode::PreconditionFailed);
    }
    if let Some((skill, required)) = &job.skill_required {
        let have = match skill.as_str() {
            "driving" => agent.skills.driving,
            "negotiation" => agent.skills.negotiation,
            "stealth" => agent.skills.stealth,
            "combat" => agent.skills.combat,
            _ => 0,
        };
        if have < *required {
            return Err(ErrorCode::PreconditionFailed);
        }
    }
    if agent.stamina < job.stamina_cost {
        return Err(ErrorCode::PreconditionFailed);
    }

    let agent = world.agents.get_mut(&agent_id).unwrap();
    agent.adjust_stamina(-job.stamina_cost);

    let tick = world.tick();
    let until_tick = tick + job.duration_ticks;
    world.set_busy(agent_id, "take_job", until_tick, PendingCompletion::TakeJob { job_id: job.id.clone() })?;

    Ok(json!({ "busyUntilTick": until_tick, "jobId": job.id }))
}

pub fn complete_take_job(world: &mut WorldData, agent_id: AgentId, job_id: JobId) {
    let Some(job) = world.jobs.get(&job_id).cloned() else { return };
    let _ = world.post_ledger(agent_id, EntryKind::Credit, job.wage, "job_wage", None);
    if let Some(agent) = world.agents.get_mut(&agent_id) {
        agent.stats.jobs_completed += 1;
    }
    world.emit_with_payload(EventType::JobCompleted, agent_id, json!({ "jobId": job_id, "wage": job.wage }));
}

pub fn handle_heal(world: &mut WorldData, agent_id: AgentId) -> Result<serde_json::Value, ErrorCode> {
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    let zone = world.zones.get(&agent.location_zone_id).ok_or(ErrorCode::PreconditionFailed)?;
    if zone.zone_type != ZoneType::Hospital {
        return Err(ErrorCode::PreconditionFailed);
    }

    let damage = 100 - agent.health;
    let cost = Decimal::from(damage) * HEAL_COST_PER_HP;
    world.post_ledger(agent_id, EntryKind::Debit, cost, "heal_cost", None).map_err(|_| ErrorCode::InsufficientFunds)?;

    let duration = rand_i32(HEAL_MIN_TICKS as i32..=HEAL_MAX_TICKS as i32) as u64;
    let tick = world.tick();
    let until_tick = tick + duration;
    world.set_busy(agent_id, "heal", until_tick, PendingCompletion::Heal)?;

    Ok(json!({ "busyUntilTick": until_tick, "cost": cost }))
}

pub fn complete_heal(world: &mut WorldData, agent_id: AgentId) {
    if let Some(agent) = world.agents.get_mut(&agent_id) {
        agent.health = 100;
        if agent.status == AgentStatus::Busy {
            agent.status = AgentStatus::Idle;
        }
    }
    world.emit_simple(EventType::HealCompleted, agent_id);
}

pub fn handle_rest(world: &mut WorldData, agent_id: AgentId) -> Result<serde_json::Value, ErrorCode> {
    let tick = world.tick();
    let until_tick = tick + REST_DURATION_TICKS;
    world.set_busy(agent_id, "rest", until_tick, PendingCompletion::Rest)?;
    Ok(json!({ "busyUntilTick": until_tick }))
}

pub fn complete_rest(world: &mut WorldData, agent_id: AgentId) {
    if let Some(agent) = world.agents.get_mut(&agent_id) {
        agent.stamina = 100;
    }
    world.emit_simple(EventType::RestCompleted, agent_id);
}

pub fn handle_use_item(world: &mut WorldData, agent_id: AgentId, item_id: ItemId) -> Result<serde_json::Value, ErrorCode> {
    let item = world.items.get(&item_id).cloned().ok_or(ErrorCode::PreconditionFailed)?;
    let agent = world.agents.get_mut(&agent_id).ok_or(ErrorCode::AgentNotFound)?;

    if !agent.remove_item(&item_id, 1) {
        return Err(ErrorCode::InsufficientInventory);
    }

    let max_heat = world.config().max_heat;
    let agent = world.agents.get_mut(&agent_id).unwrap();
    agent.adjust_health(item.health_delta);
    agent.adjust_stamina(item.stamina_delta);
    agent.adjust_heat(item.heat_delta, max_heat);

    world.emit_with_payload(EventType::ItemUsed, agent_id, json!({ "itemId": item_id }));
    Ok(json!({ "itemId": item_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bare_world, sample_item, sample_job, spawn_agent};
    use rust_decimal_macros::dec;

    #[test]
    fn move_charges_cash_and_busies_the_agent() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(100));

        let result = handle_move(&mut world, agent_id, "market".to_string()).unwrap();
        assert_eq!(result["toZone"], "market");
        assert_eq!(world.agents[&agent_id].cash, dec!(90));
        assert_eq!(world.agents[&agent_id].status, AgentStatus::Busy);
    }

    #[test]
    fn move_to_unconnected_zone_is_precondition_failed() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(100));
        let err = handle_move(&mut world, agent_id, "hospital".to_string()).unwrap_err();
        assert_eq!(err, ErrorCode::PreconditionFailed);
    }

    #[test]
    fn move_without_enough_cash_is_insufficient_funds() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(1));
        let err = handle_move(&mut world, agent_id, "market".to_string()).unwrap_err();
        assert_eq!(err, ErrorCode::InsufficientFunds);
    }

    #[test]
    fn take_job_requires_matching_zone() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(100));
        let job_id = sample_job(&mut world, "market", dec!(50));
        let err = handle_take_job(&mut world, agent_id, job_id).unwrap_err();
        assert_eq!(err, ErrorCode::PreconditionFailed);
    }

    #[test]
    fn take_job_then_complete_pays_wage() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(100));
        let job_id = sample_job(&mut world, "residential", dec!(50));

        handle_take_job(&mut world, agent_id, job_id.clone()).unwrap();
        assert_eq!(world.agents[&agent_id].status, AgentStatus::Busy);

        complete_take_job(&mut world, agent_id, job_id);
        assert_eq!(world.agents[&agent_id].cash, dec!(150));
        assert_eq!(world.agents[&agent_id].stats.jobs_completed, 1);
    }

    #[test]
    fn heal_requires_hospital_zone() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(100));
        let err = handle_heal(&mut world, agent_id).unwrap_err();
        assert_eq!(err, ErrorCode::PreconditionFailed);
    }

    #[test]
    fn heal_in_hospital_heals_to_full_on_completion() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(1000));
        world.relocate_agent(agent_id, "hospital".to_string()).unwrap();
        world.agents.get_mut(&agent_id).unwrap().health = 40;

        handle_heal(&mut world, agent_id).unwrap();
        complete_heal(&mut world, agent_id);
        assert_eq!(world.agents[&agent_id].health, 100);
        assert_eq!(world.agents[&agent_id].status, AgentStatus::Idle);
    }

    #[test]
    fn rest_restores_stamina_on_completion() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(100));
        world.agents.get_mut(&agent_id).unwrap().stamina = 10;

        handle_rest(&mut world, agent_id).unwrap();
        complete_rest(&mut world, agent_id);
        assert_eq!(world.agents[&agent_id].stamina, 100);
    }

    #[test]
    fn use_item_without_inventory_is_insufficient_inventory() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(100));
        let item_id = sample_item(&mut world, 10, 0, 0);
        let err = handle_use_item(&mut world, agent_id, item_id).unwrap_err();
        assert_eq!(err, ErrorCode::InsufficientInventory);
    }

    #[test]
    fn use_item_applies_deltas_and_consumes_one() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(100));
        let item_id = sample_item(&mut world, -10, 5, 0);
        world.agents.get_mut(&agent_id).unwrap().add_item(item_id.clone(), 2);
        world.agents.get_mut(&agent_id).unwrap().health = 50;
        world.agents.get_mut(&agent_id).unwrap().stamina = 50;

        handle_use_item(&mut world, agent_id, item_id.clone()).unwrap();
        assert_eq!(world.agents[&agent_id].health, 40);
        assert_eq!(world.agents[&agent_id].stamina, 55);
        assert_eq!(world.agents[&agent_id].inventory[&item_id], 1);
    }
}
