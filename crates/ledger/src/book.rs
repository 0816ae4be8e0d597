//! `LedgerBook`: the `Post` API of spec §4.5.
//!
//! Grounded on the teacher's balance-ledger description in
//! `verimantle-treasury` (one running balance per agent, every mutation
//! appended to an audit trail) and the bounded append-log shape of
//! `agentkern-arbiter::audit::AuditLedger` — unlike that ledger, this one is
//! never pruned: ledger entries back the `cash` invariant for the lifetime
//! of the agent, so dropping old entries would make the invariant
//! unverifiable.

use std::collections::HashMap;

use clawcity_types::{AgentId, Amount, EventId, Tick};

use crate::entry::{EntryKind, LedgerEntry};
use crate::error::LedgerError;

#[derive(Debug, Default)]
pub struct LedgerBook {
    entries: Vec<LedgerEntry>,
    by_agent: HashMap<AgentId, Vec<usize>>,
}

impl LedgerBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a cash movement against `current_cash`, returning the new
    /// balance. The caller (the entity layer) is responsible for writing the
    /// returned balance back onto the agent in the same transaction.
    pub fn post(
        &mut self,
        agent_id: AgentId,
        tick: Tick,
        current_cash: Amount,
        kind: EntryKind,
        amount: Amount,
        reason: impl Into<String>,
        ref_event_id: Option<EventId>,
    ) -> Result<Amount, LedgerError> {
        debug_assert!(amount >= Amount::ZERO, "ledger amounts must be non-negative");

        let balance = match kind {
            EntryKind::Credit => current_cash + amount,
            EntryKind::Debit => {
                if current_cash < amount {
                    return Err(LedgerError::InsufficientFunds {
                        agent_id,
                        have: current_cash,
                        need: amount,
                    });
                }
                current_cash - amount
            }
        };

        let reason = reason.into();
        tracing::debug!(%agent_id, ?kind, %amount, %reason, %balance, "ledger post");

        let index = self.entries.len();
        self.entries.push(LedgerEntry {
            tick,
            agent_id,
            kind,
            amount,
            reason,
            balance,
            ref_event_id,
        });
        self.by_agent.entry(agent_id).or_default().push(index);

        Ok(balance)
    }

    /// All entries for an agent, in posting order.
    pub fn entries_for(&self, agent_id: AgentId) -> impl Iterator<Item = &LedgerEntry> {
        self.by_agent
            .get(&agent_id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.entries[i])
    }

    /// Replay an agent's ledger from scratch and return the signed sum of
    /// credits minus debits. Used by the ledger-conservation property test
    /// (spec §8 invariant 1): this must equal the agent's live `cash`.
    pub fn reconstructed_balance(&self, agent_id: AgentId) -> Amount {
        self.entries_for(agent_id).fold(Amount::ZERO, |acc, e| match e.kind {
            EntryKind::Credit => acc + e.amount,
            EntryKind::Debit => acc - e.amount,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn credit_then_debit_reconstructs() {
        let mut book = LedgerBook::new();
        let agent = Uuid::new_v4();

        let b1 = book
            .post(agent, 1, dec!(0), EntryKind::Credit, dec!(500), "starting_cash", None)
            .unwrap();
        assert_eq!(b1, dec!(500));

        let b2 = book
            .post(agent, 2, b1, EntryKind::Debit, dec!(120), "move_cost", None)
            .unwrap();
        assert_eq!(b2, dec!(380));

        assert_eq!(book.reconstructed_balance(agent), dec!(380));
    }

    #[test]
    fn debit_beyond_balance_is_rejected() {
        let mut book = LedgerBook::new();
        let agent = Uuid::new_v4();
        book.post(agent, 1, dec!(0), EntryKind::Credit, dec!(10), "seed", None)
            .unwrap();

        let err = book
            .post(agent, 2, dec!(10), EntryKind::Debit, dec!(50), "overspend", None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        // Rejected posts must not appear in the agent's ledger.
        assert_eq!(book.entries_for(agent).count(), 1);
    }
}
