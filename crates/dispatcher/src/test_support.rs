//! Shared fixtures for handler unit tests. Not part of the public API.

#![cfg(test)]

use std::collections::HashMap;

use clawcity_types::AgentId;
use clawcity_world::config::WorldConfig;
use clawcity_world::model::{Agent, AgentStatus, Item, Job, Zone, ZoneEdge, ZoneType};
use clawcity_world::singleton::WorldSingleton;
use clawcity_world::store::WorldData;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// A bare `WorldData` with a ticking singleton and two connected zones
/// (`residential`, `market`), mirroring the shape of the bundled seed data
/// without depending on it, so handler tests stay independent of the seed
/// catalog's exact contents.
pub fn bare_world() -> WorldData {
    let mut world = WorldData::default();
    world.singleton = Some(WorldSingleton::new(1, WorldConfig::default()));

    world.zones.insert(
        "residential".to_string(),
        Zone {
            slug: "residential".to_string(),
            name: "Residential".to_string(),
            zone_type: ZoneType::Residential,
            description: String::new(),
            map_x: None,
            map_y: None,
            police_presence: 0.2,
        },
    );
    world.zones.insert(
        "market".to_string(),
        Zone {
            slug: "market".to_string(),
            name: "Market".to_string(),
            zone_type: ZoneType::Market,
            description: String::new(),
            map_x: None,
            map_y: None,
            police_presence: 0.4,
        },
    );
    world.zones.insert(
        "hospital".to_string(),
        Zone {
            slug: "hospital".to_string(),
            name: "Hospital".to_string(),
            zone_type: ZoneType::Hospital,
            description: String::new(),
            map_x: None,
            map_y: None,
            police_presence: 0.1,
        },
    );
    world.zone_edges.push(ZoneEdge {
        from: "residential".to_string(),
        to: "market".to_string(),
        time_cost_ticks: 2,
        cash_cost: dec!(10),
        heat_risk: 0.0,
    });
    world.zone_edges.push(ZoneEdge {
        from: "market".to_string(),
        to: "residential".to_string(),
        time_cost_ticks: 2,
        cash_cost: dec!(10),
        heat_risk: 0.0,
    });

    world
}

/// Insert a fresh idle agent with `cash` in the residential zone and return
/// its id.
pub fn spawn_agent(world: &mut WorldData, name: &str, cash: rust_decimal::Decimal) -> AgentId {
    let tick = world.tick();
    let agent = Agent {
        id: Uuid::new_v4(),
        agent_key_hash: format!("hash-{name}"),
        name: name.to_string(),
        is_npc: false,
        created_at: chrono::Utc::now(),
        location_zone_id: "residential".to_string(),
        cash,
        health: 100,
        stamina: 100,
        reputation: 0,
        heat: 0,
        status: AgentStatus::Idle,
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
        tax_owed: Default::default(),
        banned_at: None,
        last_action_tick: tick,
        last_killed_by: None,
        last_killed_at_tick: None,
    };
    let id = agent.id;
    world.insert_agent(agent);
    id
}

pub fn sample_job(world: &mut WorldData, zone_id: &str, wage: rust_decimal::Decimal) -> clawcity_types::JobId {
    let id = format!("job-{}", Uuid::new_v4());
    world.jobs.insert(
        id.clone(),
        Job {
            id: id.clone(),
            zone_id: zone_id.to_string(),
            name: "Courier run".to_string(),
            wage,
            duration_ticks: 3,
            stamina_cost: 10,
            reputation_required: 0,
            skill_required: None,
        },
    );
    id
}

pub fn sample_item(world: &mut WorldData, health_delta: i32, stamina_delta: i32, heat_delta: i32) -> clawcity_types::ItemId {
    let id = format!("item-{}", Uuid::new_v4());
    world.items.insert(
        id.clone(),
        Item { id: id.clone(), name: "Widget".to_string(), base_price: dec!(5), health_delta, stamina_delta, heat_delta },
    );
    id
}
