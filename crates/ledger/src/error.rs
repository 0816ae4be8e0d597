use clawcity_types::{AgentId, Amount};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("agent {agent_id} has {have} but needs {need}")]
    InsufficientFunds {
        agent_id: AgentId,
        have: Amount,
        need: Amount,
    },
}
