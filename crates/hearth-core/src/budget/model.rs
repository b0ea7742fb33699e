//! Budget domain models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A caller's personal budget. One per user, overwritten wholesale on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub net_income: f64,
    pub expenses: f64,
    pub goals: String,
}

impl Budget {
    /// Income left over after expenses. Negative when overspending.
    pub fn surplus(&self) -> f64 {
        self.net_income - self.expenses
    }
}

/// Direction of a ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

/// An ad hoc budget line kept only on this device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub id: String,
    pub kind: EntryKind,
    pub description: String,
    pub amount: f64,
}

impl BudgetEntry {
    pub fn new(kind: EntryKind, description: impl Into<String>, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            description: description.into(),
            amount,
        }
    }
}

/// Sums of ledger lines by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    pub total_income: f64,
    pub total_expenses: f64,
}

impl LedgerTotals {
    pub fn from_entries(entries: &[BudgetEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut totals, entry| {
            match entry.kind {
                EntryKind::Income => totals.total_income += entry.amount,
                EntryKind::Expense => totals.total_expenses += entry.amount,
            }
            totals
        })
    }

    pub fn balance(&self) -> f64 {
        self.total_income - self.total_expenses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_wire_format() {
        let budget = Budget {
            net_income: 3000.0,
            expenses: 1200.5,
            goals: "Save for a bike".to_string(),
        };
        let json = serde_json::to_value(&budget).unwrap();
        assert_eq!(json["netIncome"], 3000.0);
        assert_eq!(json["expenses"], 1200.5);
        assert!((budget.surplus() - 1799.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ledger_totals() {
        let entries = vec![
            BudgetEntry::new(EntryKind::Income, "Salary", 2500.0),
            BudgetEntry::new(EntryKind::Expense, "Rent", 900.0),
            BudgetEntry::new(EntryKind::Expense, "Food", 300.0),
            BudgetEntry::new(EntryKind::Income, "Side job", 200.0),
        ];
        let totals = LedgerTotals::from_entries(&entries);
        assert_eq!(totals.total_income, 2700.0);
        assert_eq!(totals.total_expenses, 1200.0);
        assert_eq!(totals.balance(), 1500.0);
    }

    #[test]
    fn test_entries_get_unique_ids() {
        let a = BudgetEntry::new(EntryKind::Income, "a", 1.0);
        let b = BudgetEntry::new(EntryKind::Income, "a", 1.0);
        assert_ne!(a.id, b.id);
    }
}
