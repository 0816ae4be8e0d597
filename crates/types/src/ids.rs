//! Shared identifier aliases.
//!
//! Per the data model: most entities are addressed by opaque UUID; zones,
//! items, and jobs are addressed by their seed-data slug. We deliberately
//! keep these as aliases rather than newtype wrappers — every entity table
//! in `clawcity-world` is keyed directly by these types, and the call sites
//! read the same whether the id is a UUID or a slug.

use uuid::Uuid;

pub type AgentId = Uuid;
pub type GangId = Uuid;
pub type BusinessId = Uuid;
pub type PropertyId = Uuid;
pub type VehicleId = Uuid;
pub type DisguiseId = Uuid;
pub type BountyId = Uuid;
pub type CoopActionId = Uuid;
pub type EventId = Uuid;
pub type ContractId = Uuid;
pub type MessageId = Uuid;

/// Zones, items, jobs, and businesses are seeded with human-readable slugs.
pub type ZoneId = String;
pub type ItemId = String;
pub type JobId = String;

/// Discrete simulated time. Strictly monotone; only the tick pipeline writes
/// the copy held on the world singleton.
pub type Tick = u64;
