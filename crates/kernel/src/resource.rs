//! Named resources the kernel can take a lock on (spec §5 "Shared resources
//! and locking").

use clawcity_types::{AgentId, BusinessId, GangId, ZoneId};

/// A lockable resource, rendered to a stable string key for the lock table.
///
/// One variant per row class named in spec §5: an agent row, a gang
/// treasury, a business's inventory/cash, and a zone's territory record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    Agent(AgentId),
    Gang(GangId),
    Business(BusinessId),
    Territory(ZoneId),
}

impl Resource {
    fn key(&self) -> String {
        match self {
            Resource::Agent(id) => format!("agent:{id}"),
            Resource::Gang(id) => format!("gang:{id}"),
            Resource::Business(id) => format!("business:{id}"),
            Resource::Territory(zone_id) => format!("territory:{zone_id}"),
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Order a pair of agent ids into `(smaller, larger)` so any call site
/// taking both rows always acquires them in the same order (spec §5: "Multi-
/// agent actions ... acquire both rows in a canonical order (smaller id
/// first) to avoid deadlock").
pub fn canonical_agent_pair(a: AgentId, b: AgentId) -> (Resource, Resource) {
    if a < b {
        (Resource::Agent(a), Resource::Agent(b))
    } else {
        (Resource::Agent(b), Resource::Agent(a))
    }
}
