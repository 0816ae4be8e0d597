//! Shared handles every handler dispatches through.

use std::sync::Arc;

use clawcity_auth::ActionLockStore;
use clawcity_kernel::LockTable;
use clawcity_world::WorldStore;

#[derive(Clone)]
pub struct DispatchContext {
    pub store: WorldStore,
    pub action_locks: Arc<ActionLockStore>,
    pub locks: Arc<LockTable>,
}

impl DispatchContext {
    pub fn new(store: WorldStore) -> Self {
        Self { store, action_locks: Arc::new(ActionLockStore::new()), locks: Arc::new(LockTable::new()) }
    }
}
