//! The pluggable NPC decision policy hook (spec §1 Out-of-scope: "the core
//! exposes a pluggable policy hook per NPC; the policy's aggressiveness/greed
//! heuristics are not part of the core contract").
//!
//! `clawcity-clock`'s tick pipeline phase 12 drives this: for every active
//! NPC due a step, it asks the configured `NpcPolicy` for one action and
//! dispatches it through the same [`dispatch`](crate::dispatch::dispatch)
//! path a real client would use, with a synthesized `requestId` so the step
//! still goes through idempotency bookkeeping.

use clawcity_types::AgentId;

use crate::action::ActionKind;
use crate::context::DispatchContext;
use crate::dispatch::dispatch;
use crate::result::ActionResult;

/// A read-only view of one NPC's situation, enough for a policy to decide
/// its next move without handing it a mutable world reference.
#[derive(Debug, Clone)]
pub struct NpcView {
    pub agent_id: AgentId,
    pub cash: rust_decimal::Decimal,
    pub health: i32,
    pub stamina: i32,
    pub heat: i32,
    pub location_zone_id: clawcity_types::ZoneId,
}

/// Implemented by whatever greed/aggressiveness heuristics a deployment
/// wants; the core only ever calls `decide`.
pub trait NpcPolicy: Send + Sync {
    /// Return the action this NPC should take this step, or `None` to idle
    /// (no dispatch call is made, and `lastActionTick` is left untouched so
    /// the NPC is reconsidered next period).
    fn decide(&self, view: &NpcView) -> Option<ActionKind>;
}

/// Policy that never acts. Used as the default when a deployment does not
/// supply its own heuristics — NPCs sit idle forever rather than the tick
/// pipeline crashing for lack of a policy.
pub struct NoopPolicy;

impl NpcPolicy for NoopPolicy {
    fn decide(&self, _view: &NpcView) -> Option<ActionKind> {
        None
    }
}

/// Run one NPC's step: ask the policy for an action, dispatch it under a
/// synthesized `requestId` (spec §4.1 phase 12), and swallow any error —
/// the caller is expected to log/emit it, not abort the tick.
pub async fn run_npc_step(ctx: &DispatchContext, policy: &dyn NpcPolicy, view: NpcView, tick: clawcity_types::Tick) -> Option<ActionResult> {
    let action = policy.decide(&view)?;
    let request_id = format!("npc-step-{}-{}", view.agent_id, tick);
    Some(dispatch(ctx, view.agent_id, &request_id, action).await)
}
