//! The pre-dispatch pipeline and the `action` → handler router (spec §4.2).

use clawcity_auth::IdempotencyCheck;
use clawcity_kernel::{canonical_agent_pair, Resource};
use clawcity_types::{AgentId, ErrorCode};
use clawcity_world::model::AgentStatus;
use clawcity_world::store::WorldData;

use crate::action::ActionKind;
use crate::context::DispatchContext;
use crate::handlers::{bounty, coop, crime, economy, gang, movement, property, social};
use crate::result::ActionResult;

/// Resources a multi-row action touches beyond the acting agent itself,
/// acquired in canonical order before the world lock is taken (spec §5:
/// "acquire both rows in a canonical order"). Single-agent actions return
/// an empty set — the world's own write lock is all the ordering they need.
fn extra_resources(agent_id: AgentId, action: &ActionKind) -> Vec<Resource> {
    match action {
        ActionKind::RobAgent { target_agent_id } | ActionKind::AttackAgent { target_agent_id } => {
            let (a, b) = canonical_agent_pair(agent_id, *target_agent_id);
            vec![a, b]
        }
        ActionKind::GiftCash { to_agent_id, .. } | ActionKind::GiftItem { to_agent_id, .. } => {
            let (a, b) = canonical_agent_pair(agent_id, *to_agent_id);
            vec![a, b]
        }
        _ => Vec::new(),
    }
}

/// Status gate from spec §4.2 step 3: evaluated after idempotency, before
/// routing to a handler.
fn check_agent_gate(world: &WorldData, agent_id: AgentId, action: &ActionKind) -> Result<(), ErrorCode> {
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    if agent.is_banned() {
        return Err(ErrorCode::AgentBanned);
    }
    match agent.status {
        AgentStatus::Jailed if !matches!(action, ActionKind::AttemptJailbreak | ActionKind::BribeCops { .. }) => {
            Err(ErrorCode::InvalidStatus)
        }
        AgentStatus::Busy => Err(ErrorCode::AgentBusy),
        AgentStatus::Hospitalized => Err(ErrorCode::InvalidStatus),
        _ => Ok(()),
    }
}

fn route(world: &mut WorldData, agent_id: AgentId, action: ActionKind) -> Result<serde_json::Value, ErrorCode> {
    match action {
        ActionKind::Move { to_zone } => movement::handle_move(world, agent_id, to_zone),
        ActionKind::TakeJob { job_id } => movement::handle_take_job(world, agent_id, job_id),
        ActionKind::Buy { business_id, item_id, qty } => economy::handle_buy(world, agent_id, business_id, item_id, qty),
        ActionKind::Sell { business_id, item_id, qty } => economy::handle_sell(world, agent_id, business_id, item_id, qty),
        ActionKind::Heal => movement::handle_heal(world, agent_id),
        ActionKind::Rest => movement::handle_rest(world, agent_id),
        ActionKind::UseItem { item_id } => movement::handle_use_item(world, agent_id, item_id),
        ActionKind::CommitCrime { crime_type } => crime::handle_commit_crime(world, agent_id, crime_type),
        ActionKind::RobAgent { target_agent_id } => crime::handle_rob_agent(world, agent_id, target_agent_id),
        ActionKind::AttackAgent { target_agent_id } => crime::handle_attack_agent(world, agent_id, target_agent_id),
        ActionKind::InitiateCoopCrime { coop_type, min_participants, max_participants, expires_in_ticks } => {
            coop::handle_initiate_coop_crime(world, agent_id, coop_type, min_participants, max_participants, expires_in_ticks)
        }
        ActionKind::JoinCoopAction { coop_action_id } => coop::handle_join_coop_action(world, agent_id, coop_action_id),
        ActionKind::PlaceBounty { target_agent_id, amount } => bounty::handle_place_bounty(world, agent_id, target_agent_id, amount),
        ActionKind::ClaimBounty { bounty_id } => bounty::handle_claim_bounty(world, agent_id, bounty_id),
        ActionKind::Gamble { bet, risk } => economy::handle_gamble(world, agent_id, bet, risk),
        ActionKind::BuyDisguise { name } => economy::handle_buy_disguise(world, agent_id, name),
        ActionKind::StealVehicle { vehicle_id } => economy::handle_steal_vehicle(world, agent_id, vehicle_id),
        ActionKind::AcceptContract { contract_id } => economy::handle_accept_contract(world, agent_id, contract_id),
        ActionKind::AttemptJailbreak => crime::handle_attempt_jailbreak(world, agent_id),
        ActionKind::BribeCops { amount } => crime::handle_bribe_cops(world, agent_id, amount),
        ActionKind::SendMessage { to_agent_id, body } => social::handle_send_message(world, agent_id, to_agent_id, body),
        ActionKind::SendFriendRequest { to_agent_id } => social::handle_send_friend_request(world, agent_id, to_agent_id),
        ActionKind::RespondFriendRequest { from_agent_id, accept } => social::handle_respond_friend_request(world, agent_id, from_agent_id, accept),
        ActionKind::GiftCash { to_agent_id, amount } => social::handle_gift_cash(world, agent_id, to_agent_id, amount),
        ActionKind::GiftItem { to_agent_id, item_id, qty } => social::handle_gift_item(world, agent_id, to_agent_id, item_id, qty),
        ActionKind::CreateGang { name } => gang::handle_create_gang(world, agent_id, name),
        ActionKind::InviteToGang { agent_id: invited_agent_id } => gang::handle_invite_to_gang(world, agent_id, invited_agent_id),
        ActionKind::RespondGangInvite { invite_id, accept } => gang::handle_respond_gang_invite(world, agent_id, invite_id, accept),
        ActionKind::LeaveGang => gang::handle_leave_gang(world, agent_id),
        ActionKind::ContributeToGang { amount } => gang::handle_contribute_to_gang(world, agent_id, amount),
        ActionKind::ClaimTerritory { zone_id } => gang::handle_claim_territory(world, agent_id, zone_id),
        ActionKind::BetrayGang => gang::handle_betray_gang(world, agent_id),
        ActionKind::BuyProperty { property_id } => property::handle_buy_property(world, agent_id, property_id),
        ActionKind::RentProperty { property_id } => property::handle_rent_property(world, agent_id, property_id),
        ActionKind::SellProperty { property_id } => property::handle_sell_property(world, agent_id, property_id),
        ActionKind::StartBusiness { name } => property::handle_start_business(world, agent_id, name),
        ActionKind::SetPrices { business_id, item_id, price } => property::handle_set_prices(world, agent_id, business_id, item_id, price),
        ActionKind::StockBusiness { business_id, item_id, qty, unit_price } => {
            property::handle_stock_business(world, agent_id, business_id, item_id, qty, unit_price)
        }
    }
}

/// `Act(agentId, requestId, action, args) → ActionResult` (spec §4.2).
///
/// Runs the full pre-dispatch pipeline: idempotency check, canonical lock
/// acquisition for multi-agent actions, the agent status gate, handler
/// dispatch, and idempotency-result recording — the handler contract's
/// "commit" step (g).
pub async fn dispatch(ctx: &DispatchContext, agent_id: AgentId, request_id: &str, action: ActionKind) -> ActionResult {
    let now = chrono::Utc::now();
    match ctx.action_locks.check_and_reserve(agent_id, request_id, now).await {
        IdempotencyCheck::Replay(result) => {
            let tick = ctx.store.read().await.tick();
            return result_from_replay(tick, result);
        }
        IdempotencyCheck::InProgress => {
            let tick = ctx.store.read().await.tick();
            return ActionResult::err(tick, ErrorCode::DuplicateRequestInProgress);
        }
        IdempotencyCheck::Fresh => {}
    }

    let resources = extra_resources(agent_id, &action);
    let _lock_guard = if resources.is_empty() { None } else { Some(ctx.locks.acquire_many(resources).await) };

    let mut world = ctx.store.write().await;
    let tick = world.tick();

    let outcome = check_agent_gate(&world, agent_id, &action).and_then(|()| route(&mut world, agent_id, action));
    drop(world);

    match outcome {
        Ok(data) => {
            let result = ActionResult::ok(tick, data.clone());
            ctx.action_locks.fulfill(agent_id, request_id, data).await;
            result
        }
        Err(error) if error.is_deterministic() => {
            let payload = serde_json::json!({ "error": error });
            ctx.action_locks.fulfill(agent_id, request_id, payload).await;
            ActionResult::err(tick, error)
        }
        Err(error) => {
            ctx.action_locks.release(agent_id, request_id).await;
            ActionResult::err(tick, error)
        }
    }
}

fn result_from_replay(tick: clawcity_types::Tick, stored: serde_json::Value) -> ActionResult {
    if let Some(error) = stored.get("error").and_then(|e| serde_json::from_value::<ErrorCode>(e.clone()).ok()) {
        ActionResult::err(tick, error)
    } else {
        ActionResult::ok(tick, stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawcity_world::{WorldConfig, WorldStore};

    async fn ctx_with_agent(cash: rust_decimal::Decimal) -> (DispatchContext, AgentId) {
        let store = WorldStore::seeded(WorldConfig::default(), 1);
        let agent_id;
        {
            let mut w = store.write().await;
            agent_id = w.register_agent("Alice".to_string(), "hash".to_string(), false);
            w.agents.get_mut(&agent_id).unwrap().cash = cash;
        }
        (DispatchContext::new(store), agent_id)
    }

    #[tokio::test]
    async fn replaying_a_request_id_returns_the_identical_result() {
        let (ctx, agent_id) = ctx_with_agent(rust_decimal_macros::dec!(1000)).await;
        let action = ActionKind::Rest;

        let first = dispatch(&ctx, agent_id, "req-1", action.clone()).await;
        let second = dispatch(&ctx, agent_id, "req-1", action).await;
        assert_eq!(first.data, second.data);
        assert_eq!(first.ok, second.ok);
    }

    #[tokio::test]
    async fn busy_agent_is_rejected_with_agent_busy() {
        let (ctx, agent_id) = ctx_with_agent(rust_decimal_macros::dec!(1000)).await;
        dispatch(&ctx, agent_id, "req-1", ActionKind::Rest).await;

        let second = dispatch(&ctx, agent_id, "req-2", ActionKind::Rest).await;
        assert_eq!(second.error, Some(ErrorCode::AgentBusy));
    }

    #[tokio::test]
    async fn unknown_agent_is_rejected_with_agent_not_found() {
        let store = WorldStore::seeded(WorldConfig::default(), 1);
        let ctx = DispatchContext::new(store);
        let result = dispatch(&ctx, uuid::Uuid::new_v4(), "req-1", ActionKind::Rest).await;
        assert_eq!(result.error, Some(ErrorCode::AgentNotFound));
    }

    #[tokio::test]
    async fn gift_cash_between_two_agents_acquires_locks_in_canonical_order() {
        let (ctx, sender) = ctx_with_agent(rust_decimal_macros::dec!(1000)).await;
        let recipient;
        {
            let mut w = ctx.store.write().await;
            recipient = w.register_agent("Bob".to_string(), "hash2".to_string(), false);
        }

        let result = dispatch(&ctx, sender, "req-1", ActionKind::GiftCash { to_agent_id: recipient, amount: rust_decimal_macros::dec!(50) }).await;
        assert!(result.ok);
        let w = ctx.store.read().await;
        assert_eq!(w.agents[&recipient].cash.round_dp(0), rust_decimal_macros::dec!(50));
    }
}
