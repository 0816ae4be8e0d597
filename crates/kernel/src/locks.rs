//! `LockTable`: one named async lock per resource, with canonical multi-
//! resource acquisition.
//!
//! Grounded on `arbiter::locks::LockManager`'s per-resource table, but
//! simplified: the kernel's only job is ordering and explicitness, not TTLs
//! or priority preemption, because `clawcity-world`'s own `RwLock<WorldData>`
//! is the actual serialization point (spec §5's "no client-visible
//! parallelism beyond canonical ordering" is already guaranteed there). This
//! table exists so call sites that touch more than one resource across
//! multiple store transactions (rob, attack, coop-action join) have an
//! explicit, testable ordering guarantee instead of an implicit one.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::resource::Resource;

#[derive(Default)]
pub struct LockTable {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Holds however many per-resource guards were acquired, in acquisition
/// order. Dropping releases them in reverse, same as any nested mutex guard.
pub struct LockGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, key: String) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Acquire a single resource lock.
    pub async fn acquire(&self, resource: &Resource) -> LockGuard {
        let mutex = self.entry(resource.to_string()).await;
        let guard = mutex.lock_owned().await;
        LockGuard { _guards: vec![guard] }
    }

    /// Acquire every resource in `resources`, always in ascending key order
    /// regardless of the order they were passed in, so two call sites
    /// racing over the same resource set can never deadlock each other.
    pub async fn acquire_many(&self, mut resources: Vec<Resource>) -> LockGuard {
        resources.sort_by_key(|r| r.to_string());
        resources.dedup_by_key(|r| r.to_string());

        let mut guards = Vec::with_capacity(resources.len());
        for resource in &resources {
            let mutex = self.entry(resource.to_string()).await;
            guards.push(mutex.lock_owned().await);
        }
        LockGuard { _guards: guards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawcity_types::AgentId;
    use std::sync::Arc as StdArc;
    use uuid::Uuid;

    #[tokio::test]
    async fn acquire_many_is_order_independent() {
        let table = StdArc::new(LockTable::new());
        let a: AgentId = Uuid::new_v4();
        let b: AgentId = Uuid::new_v4();

        let t1 = table.clone();
        let (ra, rb) = (Resource::Agent(a), Resource::Agent(b));
        let h1 = tokio::spawn(async move { t1.acquire_many(vec![ra, rb]).await });

        let t2 = table.clone();
        let (rb2, ra2) = (Resource::Agent(b), Resource::Agent(a));
        let h2 = tokio::spawn(async move { t2.acquire_many(vec![rb2, ra2]).await });

        let (g1, g2) = tokio::join!(h1, h2);
        drop(g1.unwrap());
        drop(g2.unwrap());
    }

    #[tokio::test]
    async fn second_acquire_waits_for_first_release() {
        let table = LockTable::new();
        let agent: AgentId = Uuid::new_v4();
        let resource = Resource::Agent(agent);

        let guard = table.acquire(&resource).await;
        let order = StdArc::new(tokio::sync::Mutex::new(Vec::<&str>::new()));

        let order2 = order.clone();
        let table = StdArc::new(table);
        let table2 = table.clone();
        let resource2 = Resource::Agent(agent);
        let waiter = tokio::spawn(async move {
            let _g = table2.acquire(&resource2).await;
            order2.lock().await.push("second");
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        order.lock().await.push("first");
        drop(guard);
        waiter.await.unwrap();

        assert_eq!(*order.lock().await, vec!["first", "second"]);
    }
}
