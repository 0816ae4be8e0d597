//! `PLACE_BOUNTY`, `CLAIM_BOUNTY` (spec §4.2).

use clawcity_ledger::{EntryKind, EventType};
use clawcity_types::{AgentId, BountyId, ErrorCode};
use clawcity_world::model::{Bounty, BountyStatus};
use clawcity_world::store::WorldData;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::tables::{BOUNTY_MAX, BOUNTY_MIN};

pub fn handle_place_bounty(world: &mut WorldData, agent_id: AgentId, target_agent_id: AgentId, amount: Decimal) -> Result<serde_json::Value, ErrorCode> {
    if !world.agents.contains_key(&agent_id) {
        return Err(ErrorCode::AgentNotFound);
    }
    if !world.agents.contains_key(&target_agent_id) {
        return Err(ErrorCode::PreconditionFailed);
    }
    if amount < BOUNTY_MIN || amount > BOUNTY_MAX {
        return Err(ErrorCode::BadArgs);
    }

    world.post_ledger(agent_id, EntryKind::Debit, amount, "bounty_escrow", None).map_err(|_| ErrorCode::InsufficientFunds)?;

    let tick = world.tick();
    let expiry = world.config().bounty_expiry_ticks;
    let bounty = Bounty {
        id: Uuid::new_v4(),
        target_agent_id,
        placed_by_agent_id: agent_id,
        amount,
        status: BountyStatus::Active,
        claimed_by_agent_id: None,
        created_at: chrono::Utc::now(),
        created_at_tick: tick,
        expires_at: tick + expiry,
    };
    let id = bounty.id;
    world.insert_bounty(bounty);

    world.emit_with_payload(EventType::BountyPlaced, agent_id, json!({ "bountyId": id, "targetAgentId": target_agent_id, "amount": amount }));
    Ok(json!({ "bountyId": id }))
}

pub fn handle_claim_bounty(world: &mut WorldData, agent_id: AgentId, bounty_id: BountyId) -> Result<serde_json::Value, ErrorCode> {
    let tick = world.tick();
    let bounty = world.bounties.get(&bounty_id).ok_or(ErrorCode::PreconditionFailed)?;
    if !bounty.is_active(tick) {
        return Err(ErrorCode::PreconditionFailed);
    }

    let target = world.agents.get(&bounty.target_agent_id).ok_or(ErrorCode::PreconditionFailed)?;
    let killed_by_claimer_after_creation = target.last_killed_by == Some(agent_id)
        && target.last_killed_at_tick.map(|t| t >= bounty.created_at_tick).unwrap_or(false);
    if !killed_by_claimer_after_creation {
        return Err(ErrorCode::PreconditionFailed);
    }

    let amount = bounty.amount;
    world.post_ledger(agent_id, EntryKind::Credit, amount, "bounty_claim", None).ok();

    let bounty = world.bounties.get_mut(&bounty_id).unwrap();
    bounty.status = BountyStatus::Claimed;
    bounty.claimed_by_agent_id = Some(agent_id);

    world.emit_with_payload(EventType::BountyClaimed, agent_id, json!({ "bountyId": bounty_id, "amount": amount }));
    Ok(json!({ "bountyId": bounty_id, "amount": amount }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bare_world, spawn_agent};
    use rust_decimal_macros::dec;

    #[test]
    fn place_bounty_rejects_amount_outside_bounds() {
        let mut world = bare_world();
        let placer = spawn_agent(&mut world, "A", dec!(100_000));
        let target = spawn_agent(&mut world, "B", dec!(0));

        let err = handle_place_bounty(&mut world, placer, target, dec!(1)).unwrap_err();
        assert_eq!(err, ErrorCode::BadArgs);
    }

    #[test]
    fn place_bounty_escrows_cash_from_the_placer() {
        let mut world = bare_world();
        let placer = spawn_agent(&mut world, "A", dec!(100_000));
        let target = spawn_agent(&mut world, "B", dec!(0));

        handle_place_bounty(&mut world, placer, target, dec!(1000)).unwrap();
        assert_eq!(world.agents[&placer].cash, dec!(99_000));
        assert_eq!(world.bounties.len(), 1);
    }

    #[test]
    fn claim_requires_claimer_to_have_killed_the_target_after_creation() {
        let mut world = bare_world();
        let placer = spawn_agent(&mut world, "A", dec!(100_000));
        let target = spawn_agent(&mut world, "B", dec!(0));
        let claimer = spawn_agent(&mut world, "C", dec!(0));

        let placed = handle_place_bounty(&mut world, placer, target, dec!(1000)).unwrap();
        let bounty_id: BountyId = serde_json::from_value(placed["bountyId"].clone()).unwrap();

        let err = handle_claim_bounty(&mut world, claimer, bounty_id).unwrap_err();
        assert_eq!(err, ErrorCode::PreconditionFailed);

        let created_at_tick = world.bounties[&bounty_id].created_at_tick;
        let agent = world.agents.get_mut(&target).unwrap();
        agent.last_killed_by = Some(claimer);
        agent.last_killed_at_tick = Some(created_at_tick + 1);

        handle_claim_bounty(&mut world, claimer, bounty_id).unwrap();
        assert_eq!(world.agents[&claimer].cash, dec!(1000));
        assert_eq!(world.bounties[&bounty_id].status, BountyStatus::Claimed);
    }
}
