//! `BUY_PROPERTY`, `RENT_PROPERTY`, `SELL_PROPERTY`, `START_BUSINESS`,
//! `SET_PRICES`, `STOCK_BUSINESS` (spec §4.2).

use clawcity_ledger::{EntryKind, EventType};
use clawcity_types::{AgentId, BusinessId, ErrorCode, ItemId, PropertyId};
use clawcity_world::model::{Business, PropertyResident, StockEntry};
use clawcity_world::store::WorldData;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::require_non_empty;

pub fn handle_buy_property(world: &mut WorldData, agent_id: AgentId, property_id: PropertyId) -> Result<serde_json::Value, ErrorCode> {
    let property = world.properties.get(&property_id).ok_or(ErrorCode::PreconditionFailed)?;
    if property.owner_agent_id.is_some() {
        return Err(ErrorCode::PreconditionFailed);
    }
    let price = property.price;

    world.post_ledger(agent_id, EntryKind::Debit, price, "buy_property", None).map_err(|_| ErrorCode::InsufficientFunds)?;

    let property = world.properties.get_mut(&property_id).unwrap();
    property.owner_agent_id = Some(agent_id);
    world.agents.get_mut(&agent_id).unwrap().home_property_id = Some(property_id);

    world.emit_with_payload(EventType::PropertyBought, agent_id, json!({ "propertyId": property_id, "price": price }));
    Ok(json!({ "propertyId": property_id, "price": price }))
}

pub fn handle_rent_property(world: &mut WorldData, agent_id: AgentId, property_id: PropertyId) -> Result<serde_json::Value, ErrorCode> {
    let property = world.properties.get(&property_id).ok_or(ErrorCode::PreconditionFailed)?;
    if property.owner_agent_id.is_none() || property.owner_agent_id == Some(agent_id) {
        return Err(ErrorCode::PreconditionFailed);
    }
    if world.property_residents.contains_key(&property_id) {
        return Err(ErrorCode::PreconditionFailed);
    }

    let (rent, period) = (property.rent_per_period, property.rent_period_ticks);
    world.post_ledger(agent_id, EntryKind::Debit, rent, "rent_first_period", None).map_err(|_| ErrorCode::InsufficientFunds)?;

    let tick = world.tick();
    world.property_residents.insert(property_id, PropertyResident { property_id, tenant_agent_id: agent_id, rent_due_at: tick + period });
    world.agents.get_mut(&agent_id).unwrap().home_property_id = Some(property_id);

    world.emit_with_payload(EventType::PropertyRented, agent_id, json!({ "propertyId": property_id, "rent": rent }));
    Ok(json!({ "propertyId": property_id }))
}

pub fn handle_sell_property(world: &mut WorldData, agent_id: AgentId, property_id: PropertyId) -> Result<serde_json::Value, ErrorCode> {
    let property = world.properties.get(&property_id).ok_or(ErrorCode::PreconditionFailed)?;
    if property.owner_agent_id != Some(agent_id) {
        return Err(ErrorCode::PreconditionFailed);
    }
    let payout = (property.price * Decimal::from(80) / Decimal::from(100)).round_dp(2);

    world.post_ledger(agent_id, EntryKind::Credit, payout, "sell_property", None).ok();

    let property = world.properties.get_mut(&property_id).unwrap();
    property.owner_agent_id = None;
    world.property_residents.remove(&property_id);

    if let Some(agent) = world.agents.get_mut(&agent_id) {
        if agent.home_property_id == Some(property_id) {
            agent.home_property_id = None;
        }
    }

    world.emit_with_payload(EventType::PropertySold, agent_id, json!({ "propertyId": property_id, "payout": payout }));
    Ok(json!({ "propertyId": property_id, "payout": payout }))
}

pub fn handle_start_business(world: &mut WorldData, agent_id: AgentId, name: String) -> Result<serde_json::Value, ErrorCode> {
    require_non_empty(&name)?;
    let agent = world.agents.get(&agent_id).ok_or(ErrorCode::AgentNotFound)?;
    let zone_id = agent.location_zone_id.clone();
    let cost = Decimal::from(2000);

    world.post_ledger(agent_id, EntryKind::Debit, cost, "start_business", None).map_err(|_| ErrorCode::InsufficientFunds)?;

    let business = Business { id: Uuid::new_v4(), name, zone_id, cash_on_hand: Decimal::ZERO, inventory: Default::default(), owner_agent_id: Some(agent_id) };
    let id = business.id;
    world.businesses.insert(id, business);

    world.emit_with_payload(EventType::BusinessStarted, agent_id, json!({ "businessId": id }));
    Ok(json!({ "businessId": id }))
}

pub fn handle_set_prices(world: &mut WorldData, agent_id: AgentId, business_id: BusinessId, item_id: ItemId, price: Decimal) -> Result<serde_json::Value, ErrorCode> {
    if price < Decimal::ZERO {
        return Err(ErrorCode::BadArgs);
    }
    let business = world.businesses.get_mut(&business_id).ok_or(ErrorCode::PreconditionFailed)?;
    if business.owner_agent_id != Some(agent_id) {
        return Err(ErrorCode::PreconditionFailed);
    }
    business.inventory.entry(item_id.clone()).or_insert(StockEntry { qty: 0, price }).price = price;

    world.emit_with_payload(EventType::PricesSet, agent_id, json!({ "businessId": business_id, "itemId": item_id, "price": price }));
    Ok(json!({ "itemId": item_id, "price": price }))
}

pub fn handle_stock_business(
    world: &mut WorldData,
    agent_id: AgentId,
    business_id: BusinessId,
    item_id: ItemId,
    qty: u64,
    unit_price: Decimal,
) -> Result<serde_json::Value, ErrorCode> {
    if qty == 0 || unit_price < Decimal::ZERO {
        return Err(ErrorCode::BadArgs);
    }
    let business = world.businesses.get(&business_id).ok_or(ErrorCode::PreconditionFailed)?;
    if business.owner_agent_id != Some(agent_id) {
        return Err(ErrorCode::PreconditionFailed);
    }
    let restock_cost = (unit_price * Decimal::from(qty) * Decimal::from(60) / Decimal::from(100)).round_dp(2);

    world.post_ledger(agent_id, EntryKind::Debit, restock_cost, "stock_business", None).map_err(|_| ErrorCode::InsufficientFunds)?;

    let business = world.businesses.get_mut(&business_id).unwrap();
    business
        .inventory
        .entry(item_id.clone())
        .and_modify(|s| {
            s.qty += qty;
            s.price = unit_price;
        })
        .or_insert(StockEntry { qty, price: unit_price });

    world.emit_with_payload(EventType::BusinessStocked, agent_id, json!({ "businessId": business_id, "itemId": item_id, "qty": qty }));
    Ok(json!({ "businessId": business_id, "itemId": item_id, "qty": qty }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bare_world, spawn_agent};
    use clawcity_world::model::Property;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sample_property(world: &mut WorldData, price: Decimal) -> PropertyId {
        let id = Uuid::new_v4();
        world.properties.insert(
            id,
            Property {
                id,
                zone_id: "residential".to_string(),
                name: "Flat".to_string(),
                price,
                rent_per_period: dec!(50),
                rent_period_ticks: 10,
                owner_agent_id: None,
                is_safehouse: false,
            },
        );
        id
    }

    #[test]
    fn buy_property_transfers_ownership_and_sets_home() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(10_000));
        let property_id = sample_property(&mut world, dec!(5_000));

        handle_buy_property(&mut world, agent_id, property_id).unwrap();
        assert_eq!(world.properties[&property_id].owner_agent_id, Some(agent_id));
        assert_eq!(world.agents[&agent_id].home_property_id, Some(property_id));
        assert_eq!(world.agents[&agent_id].cash, dec!(5_000));
    }

    #[test]
    fn buy_already_owned_property_is_rejected() {
        let mut world = bare_world();
        let owner = spawn_agent(&mut world, "A", dec!(10_000));
        let buyer = spawn_agent(&mut world, "B", dec!(10_000));
        let property_id = sample_property(&mut world, dec!(5_000));
        handle_buy_property(&mut world, owner, property_id).unwrap();

        let err = handle_buy_property(&mut world, buyer, property_id).unwrap_err();
        assert_eq!(err, ErrorCode::PreconditionFailed);
    }

    #[test]
    fn sell_property_pays_eighty_percent_and_clears_ownership() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(10_000));
        let property_id = sample_property(&mut world, dec!(5_000));
        handle_buy_property(&mut world, agent_id, property_id).unwrap();

        handle_sell_property(&mut world, agent_id, property_id).unwrap();
        assert_eq!(world.properties[&property_id].owner_agent_id, None);
        assert_eq!(world.agents[&agent_id].home_property_id, None);
        assert_eq!(world.agents[&agent_id].cash, dec!(9_000));
    }

    #[test]
    fn rent_property_requires_an_owner_other_than_the_tenant() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(10_000));
        let property_id = sample_property(&mut world, dec!(5_000));

        let err = handle_rent_property(&mut world, agent_id, property_id).unwrap_err();
        assert_eq!(err, ErrorCode::PreconditionFailed);
    }

    #[test]
    fn start_business_then_stock_and_set_prices() {
        let mut world = bare_world();
        let agent_id = spawn_agent(&mut world, "A", dec!(10_000));

        let result = handle_start_business(&mut world, agent_id, "Corner Store".to_string()).unwrap();
        let business_id: BusinessId = serde_json::from_value(result["businessId"].clone()).unwrap();

        handle_stock_business(&mut world, agent_id, business_id, "widget".to_string(), 10, dec!(5)).unwrap();
        assert_eq!(world.businesses[&business_id].inventory["widget"].qty, 10);

        handle_set_prices(&mut world, agent_id, business_id, "widget".to_string(), dec!(8)).unwrap();
        assert_eq!(world.businesses[&business_id].inventory["widget"].price, dec!(8));
    }

    #[test]
    fn set_prices_rejects_non_owner() {
        let mut world = bare_world();
        let owner = spawn_agent(&mut world, "A", dec!(10_000));
        let stranger = spawn_agent(&mut world, "B", dec!(10_000));
        let result = handle_start_business(&mut world, owner, "Corner Store".to_string()).unwrap();
        let business_id: BusinessId = serde_json::from_value(result["businessId"].clone()).unwrap();

        let err = handle_set_prices(&mut world, stranger, business_id, "widget".to_string(), dec!(8)).unwrap_err();
        assert_eq!(err, ErrorCode::PreconditionFailed);
    }
}
