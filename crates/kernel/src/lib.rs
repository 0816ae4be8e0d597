//! ClawCity-Kernel: canonical lock ordering and tick backpressure.
//!
//! The actual serializability guarantee (spec §5) comes from
//! `clawcity-world`'s single `RwLock<WorldData>`; this crate layers explicit,
//! testable lock ordering and single-flight tick admission on top of it.

pub mod backpressure;
pub mod locks;
pub mod resource;

pub use backpressure::{TickGate, TickInProgress, TickPermit};
pub use locks::{LockGuard, LockTable};
pub use resource::{canonical_agent_pair, Resource};
