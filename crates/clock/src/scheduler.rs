//! `TickScheduler`: fires the tick pipeline on a fixed real-time period
//! (spec §4.1 ambient note, §5 backpressure).
//!
//! Grounded on `clawcity-kernel::backpressure::TickGate`'s single-flight
//! permit: if a tick is still running when the interval fires again, that
//! fire is dropped rather than queued, so two ticks never overlap.

use std::sync::Arc;
use std::time::Duration;

use clawcity_dispatcher::context::DispatchContext;
use clawcity_dispatcher::npc::NpcPolicy;
use clawcity_kernel::TickGate;
use tokio::time::MissedTickBehavior;

use crate::pipeline::{run_tick, TickCounters};

pub struct TickScheduler {
    ctx: DispatchContext,
    policy: Arc<dyn NpcPolicy>,
    gate: TickGate,
    tick_ms: u64,
}

impl TickScheduler {
    pub fn new(ctx: DispatchContext, policy: Arc<dyn NpcPolicy>, tick_ms: u64) -> Self {
        Self { ctx, policy, gate: TickGate::new(), tick_ms }
    }

    /// Run the loop. Intended to be spawned as its own long-lived task; it
    /// never returns.
    pub async fn run(self) -> ! {
        let mut interval = tokio::time::interval(Duration::from_millis(self.tick_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let permit = match self.gate.try_begin() {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::warn!("tick fire skipped, previous tick still running");
                    continue;
                }
            };

            let counters: TickCounters = run_tick(&self.ctx, self.policy.as_ref()).await;
            tracing::debug!(?counters, "tick pipeline finished");
            drop(permit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawcity_auth::ActionLockStore;
    use clawcity_dispatcher::NoopPolicy;
    use clawcity_kernel::LockTable;
    use clawcity_world::{WorldConfig, WorldStore};

    #[tokio::test]
    async fn a_fast_second_fire_is_dropped_while_a_tick_runs() {
        let store = WorldStore::seeded(WorldConfig::default(), 1);
        let ctx = DispatchContext { store, action_locks: Arc::new(ActionLockStore::new()), locks: Arc::new(LockTable::new()) };
        let gate = TickGate::new();

        let permit = gate.try_begin().unwrap();
        assert!(gate.try_begin().is_err(), "a second fire must be rejected while the first is in flight");
        drop(permit);

        // With the gate released, a normal tick still runs fine.
        run_tick(&ctx, &NoopPolicy).await;
        assert!(gate.try_begin().is_ok());
    }
}
