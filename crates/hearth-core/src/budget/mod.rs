//! Budget domain module.
//!
//! - `model`: remote personal budget and local ledger lines
//! - `ledger`: storage port for the device-local ledger

mod ledger;
mod model;

pub use ledger::{LedgerStore, ledger_key};
pub use model::{Budget, BudgetEntry, EntryKind, LedgerTotals};
