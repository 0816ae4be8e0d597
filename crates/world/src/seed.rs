//! Built-in reference data loaded once at startup (spec §1 Out-of-scope:
//! "seed-data catalogs ... the core consumes these as read-only reference
//! data"). This module supplies a minimal, internally consistent dataset —
//! enough zones, jobs, and businesses to exercise the end-to-end scenarios —
//! standing in for whatever external catalog a deployment would load.

use std::collections::HashMap;

use clawcity_types::{BusinessId, ItemId, JobId, VehicleId};
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::model::{Business, Item, Job, Property, Vehicle, Zone, ZoneEdge, ZoneType};

pub struct SeedData {
    pub zones: Vec<Zone>,
    pub zone_edges: Vec<ZoneEdge>,
    pub items: Vec<Item>,
    pub jobs: Vec<Job>,
    pub businesses: Vec<Business>,
    pub vehicles: Vec<Vehicle>,
    pub properties: Vec<Property>,
}

fn zone(slug: &str, name: &str, zone_type: ZoneType, police_presence: f32) -> Zone {
    Zone {
        slug: slug.to_string(),
        name: name.to_string(),
        zone_type,
        description: format!("{name} district"),
        map_x: None,
        map_y: None,
        police_presence,
    }
}

fn edge(from: &str, to: &str, time_cost_ticks: u64, cash_cost: rust_decimal::Decimal, heat_risk: f32) -> ZoneEdge {
    ZoneEdge {
        from: from.to_string(),
        to: to.to_string(),
        time_cost_ticks,
        cash_cost,
        heat_risk,
    }
}

impl SeedData {
    /// The fixed dataset this build ships with. Deterministic: calling this
    /// twice produces byte-identical zones/items/jobs (ids aside), which
    /// integration tests rely on.
    pub fn bundled() -> Self {
        let zones = vec![
            zone("residential", "Residential", ZoneType::Residential, 0.2),
            zone("market", "Market Square", ZoneType::Market, 0.3),
            zone("industrial", "Industrial Docks", ZoneType::Industrial, 0.25),
            zone("hospital", "St. Agnes Hospital", ZoneType::Hospital, 0.1),
            zone("government", "Government Row", ZoneType::Government, 0.7),
            zone("hotzone", "The Sprawl", ZoneType::Hotzone, 0.8),
            zone("docks", "Shipping Docks", ZoneType::Docks, 0.4),
        ];

        let zone_edges = vec![
            edge("residential", "market", 1, dec!(5), 0.05),
            edge("market", "residential", 1, dec!(5), 0.05),
            edge("market", "industrial", 2, dec!(10), 0.1),
            edge("industrial", "market", 2, dec!(10), 0.1),
            edge("market", "hospital", 1, dec!(0), 0.02),
            edge("hospital", "market", 1, dec!(0), 0.02),
            edge("residential", "government", 2, dec!(15), 0.15),
            edge("government", "residential", 2, dec!(15), 0.15),
            edge("industrial", "hotzone", 2, dec!(20), 0.3),
            edge("hotzone", "industrial", 2, dec!(20), 0.3),
            edge("industrial", "docks", 1, dec!(5), 0.1),
            edge("docks", "industrial", 1, dec!(5), 0.1),
        ];

        let items = vec![
            Item {
                id: "bandage".to_string(),
                name: "Bandage".to_string(),
                base_price: dec!(15),
                health_delta: 20,
                stamina_delta: 0,
                heat_delta: 0,
            },
            Item {
                id: "energy_drink".to_string(),
                name: "Energy Drink".to_string(),
                base_price: dec!(8),
                health_delta: 0,
                stamina_delta: 25,
                heat_delta: 0,
            },
            Item {
                id: "burner_phone".to_string(),
                name: "Burner Phone".to_string(),
                base_price: dec!(40),
                health_delta: 0,
                stamina_delta: 0,
                heat_delta: -10,
            },
        ];

        let jobs = vec![
            Job {
                id: "shop_assistant".to_string(),
                zone_id: "market".to_string(),
                name: "Shop Assistant".to_string(),
                wage: dec!(40),
                duration_ticks: 3,
                stamina_cost: 15,
                reputation_required: 0,
                skill_required: None,
            },
            Job {
                id: "dock_loader".to_string(),
                zone_id: "docks".to_string(),
                name: "Dock Loader".to_string(),
                wage: dec!(70),
                duration_ticks: 5,
                stamina_cost: 30,
                reputation_required: 0,
                skill_required: None,
            },
            Job {
                id: "negotiator".to_string(),
                zone_id: "government".to_string(),
                name: "Contract Negotiator".to_string(),
                wage: dec!(150),
                duration_ticks: 6,
                stamina_cost: 20,
                reputation_required: 50,
                skill_required: Some(("negotiation".to_string(), 30)),
            },
        ];

        let mut market_stock = HashMap::new();
        market_stock.insert(
            "bandage".to_string(),
            crate::model::StockEntry { qty: 50, price: dec!(15) },
        );
        market_stock.insert(
            "energy_drink".to_string(),
            crate::model::StockEntry { qty: 80, price: dec!(8) },
        );
        let businesses = vec![Business {
            id: Uuid::new_v4(),
            name: "Corner Store".to_string(),
            zone_id: "market".to_string(),
            cash_on_hand: dec!(2000),
            inventory: market_stock,
            owner_agent_id: None,
        }];

        let vehicles = vec![Vehicle {
            id: Uuid::new_v4(),
            name: "Rusted Sedan".to_string(),
            owner_agent_id: None,
            zone_id: "residential".to_string(),
            speed_bonus_pct: 20,
        }];

        let properties = vec![Property {
            id: Uuid::new_v4(),
            zone_id: "residential".to_string(),
            name: "Walkup Apartment".to_string(),
            price: dec!(3000),
            rent_per_period: dec!(100),
            rent_period_ticks: 96,
            owner_agent_id: None,
            is_safehouse: true,
        }];

        Self {
            zones,
            zone_edges,
            items,
            jobs,
            businesses,
            vehicles,
            properties,
        }
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|i| i.id.clone()).collect()
    }

    pub fn job_ids(&self) -> Vec<JobId> {
        self.jobs.iter().map(|j| j.id.clone()).collect()
    }

    pub fn business_ids(&self) -> Vec<BusinessId> {
        self.businesses.iter().map(|b| b.id).collect()
    }

    pub fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.iter().map(|v| v.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_edges_reference_known_zones() {
        let seed = SeedData::bundled();
        let slugs: std::collections::HashSet<_> = seed.zones.iter().map(|z| z.slug.clone()).collect();
        for e in &seed.zone_edges {
            assert!(slugs.contains(&e.from), "dangling edge.from {}", e.from);
            assert!(slugs.contains(&e.to), "dangling edge.to {}", e.to);
        }
    }

    #[test]
    fn bundled_jobs_reference_known_zones() {
        let seed = SeedData::bundled();
        let slugs: std::collections::HashSet<_> = seed.zones.iter().map(|z| z.slug.clone()).collect();
        for j in &seed.jobs {
            assert!(slugs.contains(&j.zone_id));
        }
    }
}
