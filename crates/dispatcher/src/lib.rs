//! Action Dispatcher: the single mutation entry point for agent-submitted
//! actions (spec §4.2), plus the NPC policy hook that rides the same path.

pub mod action;
pub mod context;
pub mod dispatch;
pub mod handlers;
pub mod helpers;
pub mod npc;
pub mod result;
pub mod tables;
#[cfg(test)]
mod test_support;

pub use action::{ActionKind, CrimeType, GambleRisk};
pub use context::DispatchContext;
pub use dispatch::dispatch;
pub use npc::{NoopPolicy, NpcPolicy, NpcView};
pub use result::ActionResult;
