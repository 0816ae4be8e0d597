//! ClawCity-Ledger: append-only financial and event streams.
//!
//! Per spec §4.5: `Post` is the only path by which cash ever moves, and
//! `Emit` is the only path by which an event is recorded. Neither API
//! mutates or removes a prior entry.

pub mod book;
pub mod entry;
pub mod error;
pub mod event;
pub mod log;

pub use book::LedgerBook;
pub use entry::{EntryKind, LedgerEntry};
pub use error::LedgerError;
pub use event::{Event, EventType};
pub use log::{EmitArgs, EventLog};
