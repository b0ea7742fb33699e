//! Local ledger port.

use async_trait::async_trait;

use super::model::BudgetEntry;
use crate::error::Result;
use crate::identity::Principal;

/// Storage key of a principal's ledger. Namespaced so that two people sharing
/// one device never see each other's lines.
pub fn ledger_key(principal: &Principal) -> String {
    format!("budget_entries_{}", principal)
}

/// Device-local storage for ad hoc budget lines, one namespace per identity.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Loads the principal's lines. A missing namespace is an empty ledger.
    async fn load(&self, principal: &Principal) -> Result<Vec<BudgetEntry>>;

    /// Replaces the principal's lines.
    async fn save(&self, principal: &Principal, entries: &[BudgetEntry]) -> Result<()>;

    /// Removes the principal's namespace. Called on logout.
    async fn clear(&self, principal: &Principal) -> Result<()>;
}
