//! `BUY`, `SELL`, `GAMBLE`, `BUY_DISGUISE`, `STEAL_VEHICLE`, `ACCEPT_CONTRACT`.

use clawcity_ledger::{EntryKind, EventType};
use clawcity_types::{AgentId, BusinessId, ContractId, ErrorCode, ItemId, VehicleId};
use clawcity_world::model::{ContractStatus, Disguise};
use clawcity_world::store::WorldData;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::action::GambleRisk;
use crate::helpers::roll_bernoulli;
use crate::tables::gamble_table;

pub fn handle_buy(
    world: &mut WorldData,
    agent_id: AgentId,
    business_id: BusinessId,
    item_id: ItemId,
    qty: u64,
) -> Result<serde_json::Value, ErrorCode> {
    let agent_zone = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?.location_zone_id.clone();
    let business = world.businesses.get(&business_id).ok_or(ErrorCode::PreconditionFailed)?;
    if business.zone_id != agent_zone {
        return Err(ErrorCode::PreconditionFailed);
    }
    let stock = business.inventory.get(&item_id).copied().ok_or(ErrorCode::PreconditionFailed)?;
    if stock.qty < qty {
        return Err(ErrorCode::InsufficientInventory);
    }
    let total_cost = stock.price * Decimal::from(qty);

    world.post_ledger(agent_id, EntryKind::Debit, total_cost, "buy", None).map_err(|_| ErrorCode::InsufficientFunds)?;

    let business = world.businesses.get_mut(&business_id).unwrap();
    business.cash_on_hand += total_cost;
    business.inventory.get_mut(&item_id).unwrap().qty -= qty;

    world.agents.get_mut(&agent_id).unwrap().add_item(item_id.clone(), qty);
    world.emit_with_payload(EventType::Buy, agent_id, json!({ "businessId": business_id, "itemId": item_id, "qty": qty, "cost": total_cost }));
    Ok(json!({ "itemId": item_id, "qty": qty, "cost": total_cost }))
}

pub fn handle_sell(
    world: &mut WorldData,
    agent_id: AgentId,
    business_id: BusinessId,
    item_id: ItemId,
    qty: u64,
) -> Result<serde_json::Value, ErrorCode> {
    let agent_zone = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?.location_zone_id.clone();
    let business = world.businesses.get(&business_id).ok_or(ErrorCode::PreconditionFailed)?;
    if business.zone_id != agent_zone {
        return Err(ErrorCode::PreconditionFailed);
    }
    let unit_price = business.inventory.get(&item_id).map(|s| s.price).unwrap_or(Decimal::ZERO);
    let total_value = unit_price * Decimal::from(qty);
    if business.cash_on_hand < total_value {
        return Err(ErrorCode::PreconditionFailed);
    }

    let agent = world.agents.get_mut(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    if !agent.remove_item(&item_id, qty) {
        return Err(ErrorCode::InsufficientInventory);
    }

    world.post_ledger(agent_id, EntryKind::Credit, total_value, "sell", None).ok();
    let business = world.businesses.get_mut(&business_id).unwrap();
    business.cash_on_hand -= total_value;
    business
        .inventory
        .entry(item_id.clone())
        .and_modify(|s| s.qty += qty)
        .or_insert(clawcity_world::model::StockEntry { qty, price: unit_price });

    world.emit_with_payload(EventType::Sell, agent_id, json!({ "businessId": business_id, "itemId": item_id, "qty": qty, "value": total_value }));
    Ok(json!({ "itemId": item_id, "qty": qty, "value": total_value }))
}

pub fn handle_gamble(world: &mut WorldData, agent_id: AgentId, bet: Decimal, risk: GambleRisk) -> Result<serde_json::Value, ErrorCode> {
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    let zone = world.zones.get(&agent.location_zone_id).ok_or(ErrorCode::PreconditionFailed)?;
    if zone.zone_type != clawcity_world::model::ZoneType::Market {
        return Err(ErrorCode::PreconditionFailed);
    }
    if bet <= Decimal::ZERO {
        return Err(ErrorCode::BadArgs);
    }

    world.post_ledger(agent_id, EntryKind::Debit, bet, "gamble_bet", None).map_err(|_| ErrorCode::InsufficientFunds)?;

    let (win_p, multiplier) = gamble_table(risk);
    if roll_bernoulli(win_p) {
        let payout = bet * multiplier;
        world.post_ledger(agent_id, EntryKind::Credit, payout, "gamble_payout", None).ok();
        world.emit_with_payload(EventType::GambleWon, agent_id, json!({ "bet": bet, "payout": payout }));
        Ok(json!({ "won": true, "payout": payout }))
    } else {
        world.emit_with_payload(EventType::GambleLost, agent_id, json!({ "bet": bet }));
        Ok(json!({ "won": false }))
    }
}

pub fn handle_buy_disguise(world: &mut WorldData, agent_id: AgentId, name: String) -> Result<serde_json::Value, ErrorCode> {
    let cost = Decimal::from(100);
    world.post_ledger(agent_id, EntryKind::Debit, cost, "buy_disguise", None).map_err(|_| ErrorCode::InsufficientFunds)?;

    let duration = world.config().disguise_duration_ticks;
    let tick = world.tick();
    let disguise = Disguise {
        id: Uuid::new_v4(),
        owner_agent_id: agent_id,
        name,
        heat_decay_bonus: 2,
        expires_at_tick: tick + duration,
    };
    let id = disguise.id;
    world.disguises.insert(id, disguise);
    world.emit_simple(EventType::DisguiseBought, agent_id);
    Ok(json!({ "disguiseId": id, "expiresAtTick": tick + duration }))
}

pub fn handle_steal_vehicle(world: &mut WorldData, agent_id: AgentId, vehicle_id: VehicleId) -> Result<serde_json::Value, ErrorCode> {
    let agent_zone = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?.location_zone_id.clone();
    let vehicle = world.vehicles.get(&vehicle_id).ok_or(ErrorCode::PreconditionFailed)?;
    if vehicle.zone_id != agent_zone {
        return Err(ErrorCode::PreconditionFailed);
    }
    if vehicle.owner_agent_id.is_some() {
        return Err(ErrorCode::PreconditionFailed);
    }

    let max_heat = world.config().max_heat;
    world.vehicles.get_mut(&vehicle_id).unwrap().owner_agent_id = Some(agent_id);
    let agent = world.agents.get_mut(&agent_id).unwrap();
    agent.vehicle_id = Some(vehicle_id);
    agent.adjust_heat(10, max_heat);

    world.emit_simple(EventType::VehicleStolen, agent_id);
    Ok(json!({ "vehicleId": vehicle_id }))
}

pub fn handle_accept_contract(world: &mut WorldData, agent_id: AgentId, contract_id: ContractId) -> Result<serde_json::Value, ErrorCode> {
    let contract = world.contracts.get(&contract_id).ok_or(ErrorCode::PreconditionFailed)?;
    if contract.status != ContractStatus::Offered {
        return Err(ErrorCode::PreconditionFailed);
    }
    let contract = world.contracts.get_mut(&contract_id).unwrap();
    contract.status = ContractStatus::Accepted;
    contract.accepted_by_agent_id = Some(agent_id);

    world.emit_simple(EventType::ContractAccepted, agent_id);
    Ok(json!({ "contractId": contract_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bare_world, spawn_agent};
    use clawcity_world::model::{Business, StockEntry, Vehicle};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn sample_business(world: &mut WorldData, zone_id: &str) -> BusinessId {
        let id = Uuid::new_v4();
        let mut inventory = HashMap::new();
        inventory.insert("widget".to_string(), StockEntry { qty: 5, price: dec!(10) });
        world.businesses.insert(
            id,
            Business { id, name: "Shop".to_string(), zone_id: zone_id.to_string(), cash_on_hand: dec!(1000), inventory, owner_agent_id: None },
        );
        id
    }

    #[test]
    fn buy_debits_agent_and_moves_stock() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(100));
        let business_id = sample_business(&mut world, "residential");

        handle_buy(&mut world, agent_id, business_id, "widget".to_string(), 2).unwrap();
        assert_eq!(world.agents[&agent_id].cash, dec!(80));
        assert_eq!(world.agents[&agent_id].inventory["widget"], 2);
        assert_eq!(world.businesses[&business_id].inventory["widget"].qty, 3);
    }

    #[test]
    fn buy_more_than_in_stock_is_insufficient_inventory() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(1000));
        let business_id = sample_business(&mut world, "residential");

        let err = handle_buy(&mut world, agent_id, business_id, "widget".to_string(), 99).unwrap_err();
        assert_eq!(err, ErrorCode::InsufficientInventory);
    }

    #[test]
    fn sell_requires_business_has_cash_to_pay_out() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(0));
        let business_id = sample_business(&mut world, "residential");
        world.businesses.get_mut(&business_id).unwrap().cash_on_hand = dec!(0);
        world.agents.get_mut(&agent_id).unwrap().add_item("widget".to_string(), 1);

        let err = handle_sell(&mut world, agent_id, business_id, "widget".to_string(), 1).unwrap_err();
        assert_eq!(err, ErrorCode::PreconditionFailed);
    }

    #[test]
    fn gamble_requires_market_zone_and_positive_bet() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(100));
        let err = handle_gamble(&mut world, agent_id, dec!(10), GambleRisk::Low).unwrap_err();
        assert_eq!(err, ErrorCode::PreconditionFailed);

        world.relocate_agent(agent_id, "market".to_string()).unwrap();
        let err = handle_gamble(&mut world, agent_id, dec!(0), GambleRisk::Low).unwrap_err();
        assert_eq!(err, ErrorCode::BadArgs);
    }

    #[test]
    fn gamble_always_debits_the_bet_up_front() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(100));
        world.relocate_agent(agent_id, "market".to_string()).unwrap();

        handle_gamble(&mut world, agent_id, dec!(20), GambleRisk::Low).unwrap();
        assert!(world.agents[&agent_id].cash == dec!(80) || world.agents[&agent_id].cash == dec!(80) + dec!(20) * dec!(1.5));
    }

    #[test]
    fn steal_unowned_vehicle_transfers_ownership_and_raises_heat() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(0));
        let vehicle_id = Uuid::new_v4();
        world.vehicles.insert(vehicle_id, Vehicle { id: vehicle_id, name: "Sedan".to_string(), owner_agent_id: None, zone_id: "residential".to_string(), speed_bonus_pct: 0 });

        handle_steal_vehicle(&mut world, agent_id, vehicle_id).unwrap();
        assert_eq!(world.vehicles[&vehicle_id].owner_agent_id, Some(agent_id));
        assert_eq!(world.agents[&agent_id].heat, 10);
    }
}
