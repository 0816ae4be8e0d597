//! `SEND_MESSAGE`, `SEND_FRIEND_REQUEST`, `RESPOND_FRIEND_REQUEST`,
//! `GIFT_CASH`, `GIFT_ITEM` (spec §4.2).

use clawcity_ledger::{EntryKind, EventType};
use clawcity_types::{AgentId, ErrorCode, ItemId};
use clawcity_world::model::{canonical_pair, Friendship, FriendshipStatus, Message};
use clawcity_world::store::WorldData;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::require_non_empty;

pub fn handle_send_message(world: &mut WorldData, agent_id: AgentId, to_agent_id: AgentId, body: String) -> Result<serde_json::Value, ErrorCode> {
    require_non_empty(&body)?;
    if !world.agents.contains_key(&to_agent_id) {
        return Err(ErrorCode::PreconditionFailed);
    }

    let tick = world.tick();
    let message = Message { id: Uuid::new_v4(), from_agent_id: agent_id, to_agent_id, body, sent_at: chrono::Utc::now(), sent_at_tick: tick };
    let id = message.id;
    world.messages.insert(id, message);

    world.emit_with_payload(EventType::MessageSent, agent_id, json!({ "messageId": id, "toAgentId": to_agent_id }));
    Ok(json!({ "messageId": id }))
}

pub fn handle_send_friend_request(world: &mut WorldData, agent_id: AgentId, to_agent_id: AgentId) -> Result<serde_json::Value, ErrorCode> {
    if agent_id == to_agent_id {
        return Err(ErrorCode::BadArgs);
    }
    if !world.agents.contains_key(&to_agent_id) {
        return Err(ErrorCode::PreconditionFailed);
    }
    let key = canonical_pair(agent_id, to_agent_id);
    if world.friendships.contains_key(&key) {
        return Err(ErrorCode::PreconditionFailed);
    }

    let tick = world.tick();
    let friendship = Friendship::new(agent_id, to_agent_id, agent_id, chrono::Utc::now(), tick);
    world.upsert_friendship(friendship);

    world.emit_with_payload(EventType::FriendRequestSent, agent_id, json!({ "toAgentId": to_agent_id }));
    Ok(json!({ "status": "pending" }))
}

pub fn handle_respond_friend_request(world: &mut WorldData, agent_id: AgentId, from_agent_id: AgentId, accept: bool) -> Result<serde_json::Value, ErrorCode> {
    let key = canonical_pair(agent_id, from_agent_id);
    let friendship = world.friendships.get(&key).ok_or(ErrorCode::PreconditionFailed)?;
    if friendship.status != FriendshipStatus::Pending || friendship.initiator_id != from_agent_id {
        return Err(ErrorCode::PreconditionFailed);
    }

    let tick = world.tick();
    let friendship = world.friendships.get_mut(&key).unwrap();
    friendship.status = if accept { FriendshipStatus::Accepted } else { FriendshipStatus::Blocked };
    friendship.last_interaction_tick = tick;

    let event_type = if accept { EventType::FriendRequestAccepted } else { EventType::FriendshipEnded };
    world.emit_with_payload(event_type, agent_id, json!({ "fromAgentId": from_agent_id, "accepted": accept }));
    Ok(json!({ "accepted": accept }))
}

pub fn handle_gift_cash(world: &mut WorldData, agent_id: AgentId, to_agent_id: AgentId, amount: Decimal) -> Result<serde_json::Value, ErrorCode> {
    if amount <= Decimal::ZERO {
        return Err(ErrorCode::BadArgs);
    }
    if !world.agents.contains_key(&to_agent_id) {
        return Err(ErrorCode::PreconditionFailed);
    }

    world.post_ledger(agent_id, EntryKind::Debit, amount, "gift_cash_sent", None).map_err(|_| ErrorCode::InsufficientFunds)?;
    world.post_ledger(to_agent_id, EntryKind::Credit, amount, "gift_cash_received", None).ok();

    bump_friendship(world, agent_id, to_agent_id);
    world.emit_with_payload(EventType::GiftSent, agent_id, json!({ "toAgentId": to_agent_id, "amount": amount }));
    Ok(json!({ "toAgentId": to_agent_id, "amount": amount }))
}

pub fn handle_gift_item(world: &mut WorldData, agent_id: AgentId, to_agent_id: AgentId, item_id: ItemId, qty: u64) -> Result<serde_json::Value, ErrorCode> {
    if qty == 0 {
        return Err(ErrorCode::BadArgs);
    }
    if !world.agents.contains_key(&to_agent_id) {
        return Err(ErrorCode::PreconditionFailed);
    }

    let sender = world.agents.get_mut(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    if !sender.remove_item(&item_id, qty) {
        return Err(ErrorCode::InsufficientInventory);
    }
    world.agents.get_mut(&to_agent_id).unwrap().add_item(item_id.clone(), qty);

    bump_friendship(world, agent_id, to_agent_id);
    world.emit_with_payload(EventType::GiftSent, agent_id, json!({ "toAgentId": to_agent_id, "itemId": item_id, "qty": qty }));
    Ok(json!({ "toAgentId": to_agent_id, "itemId": item_id, "qty": qty }))
}

/// Gifts and messages nudge an existing friendship's strength (spec §4.1
/// phase 12 decays it back down over time). Does nothing if no accepted
/// friendship exists yet — gifting is not itself a friend request.
fn bump_friendship(world: &mut WorldData, a: AgentId, b: AgentId) {
    let key = canonical_pair(a, b);
    let tick = world.tick();
    if let Some(friendship) = world.friendships.get_mut(&key) {
        if friendship.status == FriendshipStatus::Accepted {
            friendship.strength = (friendship.strength + 5).min(100);
            friendship.last_interaction_tick = tick;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bare_world, spawn_agent};
    use rust_decimal_macros::dec;

    #[test]
    fn send_message_rejects_empty_body() {
        let mut world = bare_world();
        let a = spawn_agent(&mut world, "A", dec!(0));
        let b = spawn_agent(&mut world, "B", dec!(0));
        let err = handle_send_message(&mut world, a, b, "  ".to_string()).unwrap_err();
        assert_eq!(err, ErrorCode::BadArgs);
    }

    #[test]
    fn friend_request_then_accept_creates_accepted_friendship() {
        let mut world = bare_world();
        let a = spawn_agent(&mut world, "A", dec!(0));
        let b = spawn_agent(&mut world, "B", dec!(0));

        handle_send_friend_request(&mut world, a, b).unwrap();
        handle_respond_friend_request(&mut world, b, a, true).unwrap();

        let key = canonical_pair(a, b);
        assert_eq!(world.friendships[&key].status, FriendshipStatus::Accepted);
    }

    #[test]
    fn duplicate_friend_request_is_rejected() {
        let mut world = bare_world();
        let a = spawn_agent(&mut world, "A", dec!(0));
        let b = spawn_agent(&mut world, "B", dec!(0));

        handle_send_friend_request(&mut world, a, b).unwrap();
        let err = handle_send_friend_request(&mut world, a, b).unwrap_err();
        assert_eq!(err, ErrorCode::PreconditionFailed);
    }

    #[test]
    fn gift_cash_moves_funds_between_agents() {
        let mut world = bare_world();
        let a = spawn_agent(&mut world, "A", dec!(100));
        let b = spawn_agent(&mut world, "B", dec!(0));

        handle_gift_cash(&mut world, a, b, dec!(40)).unwrap();
        assert_eq!(world.agents[&a].cash, dec!(60));
        assert_eq!(world.agents[&b].cash, dec!(40));
    }

    #[test]
    fn gift_item_requires_enough_inventory() {
        let mut world = bare_world();
        let a = spawn_agent(&mut world, "A", dec!(0));
        let b = spawn_agent(&mut world, "B", dec!(0));
        let err = handle_gift_item(&mut world, a, b, "widget".to_string(), 1).unwrap_err();
        assert_eq!(err, ErrorCode::InsufficientInventory);
    }

    #[test]
    fn gift_item_transfers_quantity_between_inventories() {
        let mut world = bare_world();
        let a = spawn_agent(&mut world, "A", dec!(0));
        let b = spawn_agent(&mut world, "B", dec!(0));
        world.agents.get_mut(&a).unwrap().add_item("widget".to_string(), 3);

        handle_gift_item(&mut world, a, b, "widget".to_string(), 2).unwrap();
        assert_eq!(world.agents[&a].inventory["widget"], 1);
        assert_eq!(world.agents[&b].inventory["widget"], 2);
    }
}
