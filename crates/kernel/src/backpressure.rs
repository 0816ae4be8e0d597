//! Tick-in-progress gate.
//!
//! The tick pipeline is the only writer of `world.tick` (spec §4.1) and must
//! never run two instances concurrently — a slow tick (e.g. bogged down in
//! phase 12's best-effort work) must not let the scheduler fire a second
//! tick on top of it. Grounded on `arbiter::bulkhead`'s permit-style
//! admission gate, narrowed to a single binary permit.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, thiserror::Error)]
#[error("a tick is already in progress")]
pub struct TickInProgress;

#[derive(Default)]
pub struct TickGate {
    running: AtomicBool,
}

/// RAII permit; the gate reopens when this is dropped, including on an
/// early return or panic inside the tick pipeline.
pub struct TickPermit<'a> {
    gate: &'a TickGate,
}

impl Drop for TickPermit<'_> {
    fn drop(&mut self) {
        self.gate.running.store(false, Ordering::Release);
    }
}

impl TickGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to begin a tick. Returns `Err(TickInProgress)` if the previous
    /// tick has not yet finished, so the scheduler should skip this fire
    /// rather than queue up concurrent runs.
    pub fn try_begin(&self) -> Result<TickPermit<'_>, TickInProgress> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TickInProgress)?;
        Ok(TickPermit { gate: self })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
