use hearth_core::budget::{Budget, BudgetEntry, EntryKind, LedgerTotals};
use hearth_core::error::{HearthError, Result};
use hearth_core::remote::RemoteMethod;

use crate::cache::QueryState;
use crate::context::ClientContext;
use crate::keys;
use crate::mutation::{MutationFailure, MutationSpec};

/// The remote personal budget plus the device-local income/expense ledger.
#[derive(Clone)]
pub struct BudgetAdapter {
    ctx: ClientContext,
}

impl BudgetAdapter {
    pub(crate) fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// `None` until the caller saves a budget for the first time.
    pub async fn personal_budget(&self) -> QueryState<Option<Budget>> {
        self.ctx
            .query(keys::personal_budget(), true, RemoteMethod::GetPersonalBudget, ())
            .await
    }

    /// Overwrites the caller's budget wholesale.
    pub async fn save_personal_budget(
        &self,
        budget: Budget,
    ) -> std::result::Result<(), MutationFailure> {
        let spec = MutationSpec::new("savePersonalBudget")
            .invalidates(keys::personal_budget())
            .notice("Budget saved successfully!");
        self.ctx
            .mutate(spec, RemoteMethod::SavePersonalBudget, (budget,))
            .await
    }

    /// Another household member's budget. Disabled for an empty username.
    pub async fn budget_by_username(&self, username: &str) -> QueryState<Option<Budget>> {
        self.ctx
            .query(
                keys::budget_by_username(username),
                !username.trim().is_empty(),
                RemoteMethod::GetBudgetByUsername,
                (username.to_string(),),
            )
            .await
    }

    // ============================================================================
    // Local ledger
    // ============================================================================

    /// The caller's ledger entries in insertion order.
    pub async fn ledger_entries(&self) -> Result<Vec<BudgetEntry>> {
        let caller = self.ctx.caller().await?;
        self.ctx.ledger().load(&caller).await
    }

    /// Appends an entry and persists the ledger.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank description or a non-finite amount.
    pub async fn add_ledger_entry(
        &self,
        kind: EntryKind,
        description: &str,
        amount: f64,
    ) -> Result<BudgetEntry> {
        let description = description.trim();
        if description.is_empty() {
            return Err(HearthError::validation("Please enter a description"));
        }
        if !amount.is_finite() {
            return Err(HearthError::validation("Please enter a valid amount"));
        }

        let caller = self.ctx.caller().await?;
        let store = self.ctx.ledger();
        let mut entries = store.load(&caller).await?;
        let entry = BudgetEntry::new(kind, description, amount);
        entries.push(entry.clone());
        store.save(&caller, &entries).await?;
        tracing::debug!("[BudgetAdapter] Added ledger entry {}", entry.id);
        Ok(entry)
    }

    /// Removes the entry with `id`. Returns whether anything was removed.
    pub async fn remove_ledger_entry(&self, id: &str) -> Result<bool> {
        let caller = self.ctx.caller().await?;
        let store = self.ctx.ledger();
        let mut entries = store.load(&caller).await?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        store.save(&caller, &entries).await?;
        Ok(true)
    }

    pub async fn ledger_totals(&self) -> Result<LedgerTotals> {
        Ok(LedgerTotals::from_entries(&self.ledger_entries().await?))
    }
}
