//! `CREATE_GANG`, `INVITE_TO_GANG`, `RESPOND_GANG_INVITE`, `LEAVE_GANG`,
//! `CONTRIBUTE_TO_GANG`, `CLAIM_TERRITORY`, `BETRAY_GANG` (spec §4.2).

use std::collections::HashSet;

use clawcity_ledger::{EntryKind, EventType};
use clawcity_types::{AgentId, ErrorCode};
use clawcity_world::model::{Gang, GangInvite, GangInviteStatus, Territory};
use clawcity_world::store::WorldData;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::require_non_empty;
use crate::tables::{CLAIM_TERRITORY_COST, GANG_BETRAYAL_BAN_TICKS, GANG_CREATION_COST};

pub fn handle_create_gang(world: &mut WorldData, agent_id: AgentId, name: String) -> Result<serde_json::Value, ErrorCode> {
    require_non_empty(&name)?;
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    if agent.gang_id.is_some() {
        return Err(ErrorCode::PreconditionFailed);
    }
    if agent.gang_ban_until_tick.map(|t| t > world.tick()).unwrap_or(false) {
        return Err(ErrorCode::PreconditionFailed);
    }
    let home_zone_id = agent.location_zone_id.clone();

    world.post_ledger(agent_id, EntryKind::Debit, GANG_CREATION_COST, "gang_creation", None).map_err(|_| ErrorCode::InsufficientFunds)?;

    let gang = Gang {
        id: Uuid::new_v4(),
        name,
        leader_id: agent_id,
        treasury: Decimal::ZERO,
        reputation: 0,
        home_zone_id,
        members: HashSet::from([agent_id]),
        created_at: chrono::Utc::now(),
    };
    let id = gang.id;
    world.gangs.insert(id, gang);
    world.set_agent_gang(agent_id, Some(id))?;

    world.emit_with_payload(EventType::GangCreated, agent_id, json!({ "gangId": id }));
    Ok(json!({ "gangId": id }))
}

pub fn handle_invite_to_gang(world: &mut WorldData, agent_id: AgentId, invited_agent_id: AgentId) -> Result<serde_json::Value, ErrorCode> {
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    let gang_id = agent.gang_id.ok_or(ErrorCode::PreconditionFailed)?;
    if !world.agents.contains_key(&invited_agent_id) {
        return Err(ErrorCode::PreconditionFailed);
    }
    if world.agents[&invited_agent_id].gang_id.is_some() {
        return Err(ErrorCode::PreconditionFailed);
    }

    let tick = world.tick();
    let invite = GangInvite {
        id: Uuid::new_v4(),
        gang_id,
        invited_agent_id,
        invited_by: agent_id,
        status: GangInviteStatus::Pending,
        created_at: chrono::Utc::now(),
        expires_at_tick: tick + 200,
    };
    let id = invite.id;
    world.gang_invites.insert(id, invite);

    world.emit_with_payload(EventType::GangInvited, agent_id, json!({ "inviteId": id, "invitedAgentId": invited_agent_id }));
    Ok(json!({ "inviteId": id }))
}

pub fn handle_respond_gang_invite(world: &mut WorldData, agent_id: AgentId, invite_id: Uuid, accept: bool) -> Result<serde_json::Value, ErrorCode> {
    let invite = world.gang_invites.get(&invite_id).ok_or(ErrorCode::PreconditionFailed)?;
    if invite.invited_agent_id != agent_id || invite.status != GangInviteStatus::Pending {
        return Err(ErrorCode::PreconditionFailed);
    }
    let gang_id = invite.gang_id;

    let invite = world.gang_invites.get_mut(&invite_id).unwrap();
    invite.status = if accept { GangInviteStatus::Accepted } else { GangInviteStatus::Declined };

    if accept {
        if world.agents[&agent_id].gang_id.is_some() {
            return Err(ErrorCode::PreconditionFailed);
        }
        world.set_agent_gang(agent_id, Some(gang_id))?;
        if let Some(gang) = world.gangs.get_mut(&gang_id) {
            gang.members.insert(agent_id);
        }
        world.emit_with_payload(EventType::GangInviteAccepted, agent_id, json!({ "gangId": gang_id }));
    } else {
        world.emit_with_payload(EventType::GangInviteDeclined, agent_id, json!({ "gangId": gang_id }));
    }
    Ok(json!({ "accepted": accept }))
}

pub fn handle_leave_gang(world: &mut WorldData, agent_id: AgentId) -> Result<serde_json::Value, ErrorCode> {
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    let gang_id = agent.gang_id.ok_or(ErrorCode::PreconditionFailed)?;
    if world.gangs.get(&gang_id).map(|g| g.leader_id) == Some(agent_id) {
        return Err(ErrorCode::PreconditionFailed);
    }

    if let Some(gang) = world.gangs.get_mut(&gang_id) {
        gang.members.remove(&agent_id);
    }
    world.set_agent_gang(agent_id, None)?;

    world.emit_with_payload(EventType::GangLeft, agent_id, json!({ "gangId": gang_id }));
    Ok(json!({ "gangId": gang_id }))
}

pub fn handle_contribute_to_gang(world: &mut WorldData, agent_id: AgentId, amount: Decimal) -> Result<serde_json::Value, ErrorCode> {
    if amount <= Decimal::ZERO {
        return Err(ErrorCode::BadArgs);
    }
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    let gang_id = agent.gang_id.ok_or(ErrorCode::PreconditionFailed)?;

    world.post_ledger(agent_id, EntryKind::Debit, amount, "gang_contribution", None).map_err(|_| ErrorCode::InsufficientFunds)?;
    let gang = world.gangs.get_mut(&gang_id).unwrap();
    gang.treasury += amount;
    gang.reputation += 1;

    world.emit_with_payload(EventType::GangContribution, agent_id, json!({ "gangId": gang_id, "amount": amount }));
    Ok(json!({ "gangId": gang_id, "treasury": world.gangs[&gang_id].treasury }))
}

pub fn handle_claim_territory(world: &mut WorldData, agent_id: AgentId, zone_id: clawcity_types::ZoneId) -> Result<serde_json::Value, ErrorCode> {
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    let gang_id = agent.gang_id.ok_or(ErrorCode::PreconditionFailed)?;
    if agent.location_zone_id != zone_id {
        return Err(ErrorCode::PreconditionFailed);
    }
    if world.territories.contains_key(&zone_id) {
        return Err(ErrorCode::PreconditionFailed);
    }
    let gang = world.gangs.get(&gang_id).ok_or(ErrorCode::PreconditionFailed)?;
    if gang.treasury < CLAIM_TERRITORY_COST {
        return Err(ErrorCode::InsufficientFunds);
    }

    let tick = world.tick();
    world.gangs.get_mut(&gang_id).unwrap().treasury -= CLAIM_TERRITORY_COST;
    world.territories.insert(
        zone_id.clone(),
        Territory { zone_id: zone_id.clone(), gang_id, control_strength: 100, income_per_tick: Decimal::from(10), claimed_at: tick, last_defended_tick: tick },
    );

    world.emit_with_payload(EventType::TerritoryClaimed, agent_id, json!({ "zoneId": zone_id, "gangId": gang_id }));
    Ok(json!({ "zoneId": zone_id }))
}

/// Treasury seizure and gang dissolution (spec §4.2). Sets a
/// `gangBanUntilTick` cooldown on the betrayer so they cannot immediately
/// found or rejoin a gang.
pub fn handle_betray_gang(world: &mut WorldData, agent_id: AgentId) -> Result<serde_json::Value, ErrorCode> {
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    let gang_id = agent.gang_id.ok_or(ErrorCode::PreconditionFailed)?;
    let gang = world.gangs.get(&gang_id).ok_or(ErrorCode::PreconditionFailed)?;
    let treasury = gang.treasury;
    let members: Vec<AgentId> = gang.members.iter().copied().collect();

    if treasury > Decimal::ZERO {
        world.post_ledger(agent_id, EntryKind::Credit, treasury, "gang_betrayal_seizure", None).ok();
    }

    let tick = world.tick();
    for member in &members {
        let _ = world.set_agent_gang(*member, None);
        if let Some(a) = world.agents.get_mut(member) {
            if *member == agent_id {
                a.gang_ban_until_tick = Some(tick + GANG_BETRAYAL_BAN_TICKS);
            }
        }
    }
    world.gangs.remove(&gang_id);
    world.territories.retain(|_, t| t.gang_id != gang_id);

    world.emit_with_payload(EventType::GangBetrayed, agent_id, json!({ "gangId": gang_id, "seized": treasury }));
    Ok(json!({ "gangId": gang_id, "seized": treasury }))
}
