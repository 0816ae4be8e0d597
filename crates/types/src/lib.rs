//! ClawCity shared types.
//!
//! Identifiers, money representation, and the error taxonomy used by every
//! other crate in the world engine. Kept deliberately small and dependency-free
//! beyond serde/uuid/decimal/chrono so it sits at the bottom of the dependency
//! graph without pulling anything heavy into every downstream crate.

pub mod error;
pub mod ids;
pub mod money;

pub use error::ErrorCode;
pub use ids::{
    AgentId, BountyId, BusinessId, ContractId, CoopActionId, DisguiseId, EventId, GangId, ItemId,
    JobId, MessageId, PropertyId, Tick, VehicleId, ZoneId,
};
pub use money::Amount;
