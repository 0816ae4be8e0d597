//! Money representation.
//!
//! Cash and ledger amounts use `Decimal` rather than floating point so that
//! ledger conservation (sum of credits minus debits equals the stored
//! balance) holds exactly, not just within epsilon.

use rust_decimal::Decimal;

pub type Amount = Decimal;
