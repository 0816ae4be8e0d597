//! Ledger entries: the append-only per-agent financial journal.

use clawcity_types::{AgentId, Amount, EventId, Tick};
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Credit,
    Debit,
}

/// A single append-only ledger entry.
///
/// Invariant: for any agent, folding its entries in insertion order by
/// (credit: +amount, debit: -amount) reproduces `balance` on the last entry,
/// which in turn must equal the agent's live `cash` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub tick: Tick,
    pub agent_id: AgentId,
    pub kind: EntryKind,
    pub amount: Amount,
    pub reason: String,
    /// Running balance immediately after this entry was applied.
    pub balance: Amount,
    /// The event (if any) this cash movement is attributed to.
    pub ref_event_id: Option<EventId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn entry_is_serializable_round_trip() {
        let entry = LedgerEntry {
            tick: 3,
            agent_id: Uuid::new_v4(),
            kind: EntryKind::Credit,
            amount: dec!(120),
            reason: "crime_success".into(),
            balance: dec!(620),
            ref_event_id: Some(Uuid::new_v4()),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: LedgerEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.amount, entry.amount);
        assert_eq!(back.balance, entry.balance);
    }
}
