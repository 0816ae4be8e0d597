//! `INITIATE_COOP_CRIME`, `JOIN_COOP_ACTION`, and the coop execution outcome
//! (spec §4.4, "the trickiest subsystem").
//!
//! Initiation and joining happen synchronously under the dispatch lock, same
//! as every other handler. Execution itself is driven by the tick pipeline
//! (phase 8) once a `ready` action's `executeAt` is reached — `execute` is
//! exported so the clock crate can call it with the same world lock already
//! held.

use clawcity_ledger::{EntryKind, EventType};
use clawcity_types::{AgentId, CoopActionId, ErrorCode, Tick, ZoneId};
use clawcity_world::model::{AgentStatus, CoopAction, CoopActionType, CoopResult, CoopStatus, PendingCompletion};
use clawcity_world::store::WorldData;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::{rand_i32, roll_bernoulli};

pub fn handle_initiate_coop_crime(
    world: &mut WorldData,
    agent_id: AgentId,
    coop_type: CoopActionType,
    min_participants: u32,
    max_participants: u32,
    expires_in_ticks: u64,
) -> Result<serde_json::Value, ErrorCode> {
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    if agent.status != AgentStatus::Idle {
        return Err(ErrorCode::InvalidStatus);
    }
    if min_participants < 2 || max_participants < min_participants {
        return Err(ErrorCode::BadArgs);
    }

    let zone_id = agent.location_zone_id.clone();
    let tick = world.tick();
    let coop = CoopAction {
        id: Uuid::new_v4(),
        initiator_id: agent_id,
        action_type: coop_type,
        zone_id: zone_id.clone(),
        status: CoopStatus::Recruiting,
        participant_ids: vec![agent_id],
        min_participants: min_participants as usize,
        max_participants: max_participants as usize,
        created_at: chrono::Utc::now(),
        expires_at: tick + expires_in_ticks,
        execute_at: None,
        result: None,
    };
    let id = coop.id;
    world.insert_coop_action(coop);
    world.emit_with_payload(
        EventType::CoopActionInitiated,
        agent_id,
        json!({ "coopActionId": id, "coopType": coop_type, "zoneId": zone_id }),
    );
    Ok(json!({ "coopActionId": id }))
}

pub fn handle_join_coop_action(world: &mut WorldData, agent_id: AgentId, coop_action_id: CoopActionId) -> Result<serde_json::Value, ErrorCode> {
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    if agent.status != AgentStatus::Idle {
        return Err(ErrorCode::InvalidStatus);
    }
    let agent_zone = agent.location_zone_id.clone();

    let coop = world.coop_actions.get(&coop_action_id).ok_or(ErrorCode::PreconditionFailed)?;
    if coop.status != CoopStatus::Recruiting {
        return Err(ErrorCode::PreconditionFailed);
    }
    if coop.zone_id != agent_zone {
        return Err(ErrorCode::PreconditionFailed);
    }
    if coop.is_full() || coop.contains(agent_id) {
        return Err(ErrorCode::PreconditionFailed);
    }

    let delay = world.config().coop_execute_delay_ticks;
    let tick = world.tick();

    let coop = world.coop_actions.get_mut(&coop_action_id).unwrap();
    coop.participant_ids.push(agent_id);
    let now_ready = coop.meets_minimum() && coop.status == CoopStatus::Recruiting;
    let (action_type, participants, zone_id) =
        (coop.action_type, coop.participant_ids.clone(), coop.zone_id.clone());

    if now_ready {
        let execute_at = tick + delay;
        let coop = world.coop_actions.get_mut(&coop_action_id).unwrap();
        coop.status = CoopStatus::Ready;
        coop.execute_at = Some(execute_at);

        for participant in &participants {
            world.set_busy(
                *participant,
                action_type.busy_tag(),
                execute_at,
                PendingCompletion::CoopRendezvous { coop_action_id },
            )?;
        }
        world.emit_with_payload(
            EventType::CoopActionJoined,
            agent_id,
            json!({ "coopActionId": coop_action_id, "zoneId": zone_id, "ready": true, "executeAt": execute_at }),
        );
    } else {
        world.emit_with_payload(
            EventType::CoopActionJoined,
            agent_id,
            json!({ "coopActionId": coop_action_id, "zoneId": zone_id, "ready": false }),
        );
    }

    Ok(json!({ "coopActionId": coop_action_id, "participantCount": participants.len() }))
}

/// Cancel a `recruiting` action whose deadline has passed without reaching
/// `minParticipants` (tick pipeline phase 8), releasing every participant.
pub fn cancel_expired(world: &mut WorldData, coop_action_id: CoopActionId) {
    let Some(coop) = world.coop_actions.get_mut(&coop_action_id) else { return };
    coop.status = CoopStatus::Cancelled;
    let participants = coop.participant_ids.clone();
    for participant in participants {
        if let Some(agent) = world.agents.get_mut(&participant) {
            agent.clear_busy_to_idle();
        }
        world.take_pending_completion(participant);
    }
    world.emit_simple(EventType::CoopActionCancelled, coop_action_id_initiator(world, coop_action_id));
}

fn coop_action_id_initiator(world: &WorldData, coop_action_id: CoopActionId) -> AgentId {
    world.coop_actions.get(&coop_action_id).map(|c| c.initiator_id).unwrap_or(coop_action_id)
}

/// Success probability from spec §4.4: base + 10% per participant beyond
/// `minParticipants` (capped +30%) + 15% if every participant shares a gang
/// + 2% per strong-friendship pair (strength ≥ 75), − policePresence·10%.
fn success_probability(world: &WorldData, coop: &CoopAction, zone_police_presence: f32) -> f64 {
    let base = match coop.action_type {
        CoopActionType::CoopRobbery => 0.55,
        CoopActionType::CoopHeist => 0.35,
        CoopActionType::CoopSmuggling => 0.50,
    };
    let extra = (coop.participant_ids.len().saturating_sub(coop.min_participants)) as f64 * 0.10;
    let extra = extra.min(0.30);

    let all_same_gang = {
        let mut gangs = coop.participant_ids.iter().map(|id| world.agents.get(id).and_then(|a| a.gang_id));
        let first = gangs.next().flatten();
        first.is_some() && gangs.all(|g| g == first)
    };
    let gang_bonus = if all_same_gang { 0.15 } else { 0.0 };

    let mut strong_pairs = 0;
    for i in 0..coop.participant_ids.len() {
        for j in (i + 1)..coop.participant_ids.len() {
            let key = clawcity_world::model::canonical_pair(coop.participant_ids[i], coop.participant_ids[j]);
            if world.friendships.get(&key).map(|f| f.is_strong()).unwrap_or(false) {
                strong_pairs += 1;
            }
        }
    }
    let friendship_bonus = strong_pairs as f64 * 0.02;

    (base + extra + gang_bonus + friendship_bonus - zone_police_presence as f64 * 0.10).clamp(0.05, 0.95)
}

/// Execute a `ready` coop action whose `executeAt` has arrived (tick
/// pipeline phase 8). Commits loot/heat/damage for every participant or for
/// none (spec §8 invariant 6).
pub fn execute(world: &mut WorldData, coop_action_id: CoopActionId, tick: Tick) {
    let Some(coop) = world.coop_actions.get(&coop_action_id).cloned() else { return };
    if coop.status != CoopStatus::Ready {
        return;
    }

    let police_presence = world.zones.get(&coop.zone_id).map(|z| z.police_presence).unwrap_or(0.0);
    let p = success_probability(world, &coop, police_presence);
    let n = coop.participant_ids.len().max(1);
    let max_heat = world.config().max_heat;

    let result = if roll_bernoulli(p) {
        let total_loot = coop.action_type.base_loot() * rust_decimal_macros::dec!(1.5);
        let share = (total_loot / rust_decimal::Decimal::from(n)).round_dp(2);
        let heat_share = ((coop.action_type.heat_of() as f64 * 1.2 * 0.8) / n as f64).round() as i32;

        for participant in &coop.participant_ids {
            let _ = world.post_ledger(*participant, EntryKind::Credit, share, "coop_crime_loot", None);
            if let Some(agent) = world.agents.get_mut(participant) {
                agent.adjust_heat(heat_share, max_heat);
                agent.stats.coop_crimes_completed += 1;
            }
        }
        CoopResult { success: true, loot_per_participant: Some(share), heat_per_participant: heat_share, damage_per_participant: 0 }
    } else {
        let (lo, hi) = coop.action_type.damage_range();
        let damage = rand_i32(lo..=hi);
        let heat = coop.action_type.heat_of();
        for participant in &coop.participant_ids {
            if let Some(agent) = world.agents.get_mut(participant) {
                agent.adjust_heat(heat, max_heat);
                agent.adjust_health(-damage);
                if agent.health == 0 {
                    agent.enter_timed_status(AgentStatus::Hospitalized, tick + crate::tables::HOSPITALIZATION_TICKS);
                }
            }
        }
        CoopResult { success: false, loot_per_participant: None, heat_per_participant: heat, damage_per_participant: damage }
    };

    for participant in &coop.participant_ids {
        if let Some(agent) = world.agents.get_mut(participant) {
            if agent.status != AgentStatus::Hospitalized {
                agent.clear_busy_to_idle();
            }
        }
        world.take_pending_completion(*participant);
    }

    let event_type = if result.success { EventType::CoopCrimeSuccess } else { EventType::CoopCrimeFailed };
    let roster = coop.participant_ids.clone();
    let zone_id: ZoneId = coop.zone_id.clone();

    let coop_mut = world.coop_actions.get_mut(&coop_action_id).unwrap();
    coop_mut.status = if result.success { CoopStatus::Completed } else { CoopStatus::Failed };
    coop_mut.result = Some(result);

    world.emit_with_payload(
        event_type,
        coop.initiator_id,
        json!({ "coopActionId": coop_action_id, "zoneId": zone_id, "participantIds": roster }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bare_world, spawn_agent};
    use clawcity_world::model::CoopStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn initiate_requires_idle_agent_and_valid_bounds() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(0));

        let err = handle_initiate_coop_crime(&mut world, agent_id, CoopActionType::CoopRobbery, 1, 3, 100).unwrap_err();
        assert_eq!(err, ErrorCode::BadArgs);

        let result = handle_initiate_coop_crime(&mut world, agent_id, CoopActionType::CoopRobbery, 2, 3, 100).unwrap();
        assert!(result["coopActionId"].is_string());
        assert_eq!(world.coop_actions.len(), 1);
    }

    #[test]
    fn join_becomes_ready_once_minimum_is_met() {
        let mut world = bare_world();
        let initiator = spawn_agent(&mut world, "A", dec!(0));
        let joiner = spawn_agent(&mut world, "B", dec!(0));

        let result = handle_initiate_coop_crime(&mut world, initiator, CoopActionType::CoopRobbery, 2, 3, 100).unwrap();
        let coop_id: CoopActionId = serde_json::from_value(result["coopActionId"].clone()).unwrap();

        let joined = handle_join_coop_action(&mut world, joiner, coop_id).unwrap();
        assert_eq!(joined["participantCount"], 2);
        assert_eq!(world.coop_actions[&coop_id].status, CoopStatus::Ready);
        assert_eq!(world.agents[&initiator].status, AgentStatus::Busy);
        assert_eq!(world.agents[&joiner].status, AgentStatus::Busy);
    }

    #[test]
    fn join_rejects_agent_already_in_the_roster() {
        let mut world = bare_world();
        let initiator = spawn_agent(&mut world, "A", dec!(0));

        let result = handle_initiate_coop_crime(&mut world, initiator, CoopActionType::CoopRobbery, 2, 3, 100).unwrap();
        let coop_id: CoopActionId = serde_json::from_value(result["coopActionId"].clone()).unwrap();

        let err = handle_join_coop_action(&mut world, initiator, coop_id).unwrap_err();
        assert_eq!(err, ErrorCode::PreconditionFailed);
    }

    #[test]
    fn cancel_expired_releases_every_participant_to_idle() {
        let mut world = bare_world();
        let initiator = spawn_agent(&mut world, "A", dec!(0));
        let result = handle_initiate_coop_crime(&mut world, initiator, CoopActionType::CoopRobbery, 2, 3, 100).unwrap();
        let coop_id: CoopActionId = serde_json::from_value(result["coopActionId"].clone()).unwrap();
        world.agents.get_mut(&initiator).unwrap().set_busy("coop_wait", 999);

        cancel_expired(&mut world, coop_id);
        assert_eq!(world.coop_actions[&coop_id].status, CoopStatus::Cancelled);
        assert_eq!(world.agents[&initiator].status, AgentStatus::Idle);
    }

    #[test]
    fn execute_settles_every_participant_together_on_success_or_failure() {
        let mut world = bare_world();
        let initiator = spawn_agent(&mut world, "A", dec!(0));
        let joiner = spawn_agent(&mut world, "B", dec!(0));
        let result = handle_initiate_coop_crime(&mut world, initiator, CoopActionType::CoopRobbery, 2, 2, 100).unwrap();
        let coop_id: CoopActionId = serde_json::from_value(result["coopActionId"].clone()).unwrap();
        handle_join_coop_action(&mut world, joiner, coop_id).unwrap();
        assert_eq!(world.coop_actions[&coop_id].status, CoopStatus::Ready);

        execute(&mut world, coop_id, world.tick());

        let coop = &world.coop_actions[&coop_id];
        assert!(coop.status == CoopStatus::Completed || coop.status == CoopStatus::Failed);
        let result = coop.result.as_ref().unwrap();
        for participant in [initiator, joiner] {
            let agent = &world.agents[&participant];
            if result.success {
                assert_eq!(agent.status, AgentStatus::Idle);
            } else {
                assert!(agent.status == AgentStatus::Idle || agent.status == AgentStatus::Hospitalized);
            }
        }
    }
}
