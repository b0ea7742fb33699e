use anyhow::{Result, anyhow};
use hearth_application::ClientContext;
use hearth_core::budget::{Budget, EntryKind};

pub fn parse_kind(text: &str) -> Result<EntryKind> {
    match text {
        "income" => Ok(EntryKind::Income),
        "expense" => Ok(EntryKind::Expense),
        other => Err(anyhow!("expected 'income' or 'expense', got '{}'", other)),
    }
}

pub async fn show(ctx: &ClientContext) -> Result<()> {
    let budget = ctx.budget().personal_budget().await.into_result()?;
    match &*budget {
        Some(budget) => {
            println!("Net income: {:.2}", budget.net_income);
            println!("Expenses:   {:.2}", budget.expenses);
            println!("Surplus:    {:.2}", budget.surplus());
            if !budget.goals.is_empty() {
                println!("Goals:      {}", budget.goals);
            }
        }
        None => println!("No budget saved yet."),
    }
    Ok(())
}

pub async fn set(ctx: &ClientContext, income: f64, expenses: f64, goals: String) -> Result<()> {
    ctx.budget()
        .save_personal_budget(Budget {
            net_income: income,
            expenses,
            goals,
        })
        .await?;
    Ok(())
}

pub async fn ledger(ctx: &ClientContext) -> Result<()> {
    let budget = ctx.budget();
    for entry in budget.ledger_entries().await? {
        let sign = match entry.kind {
            EntryKind::Income => '+',
            EntryKind::Expense => '-',
        };
        println!("{}  {}{:>10.2}  {}", entry.id, sign, entry.amount, entry.description);
    }
    let totals = budget.ledger_totals().await?;
    println!(
        "income {:.2}  expenses {:.2}  balance {:.2}",
        totals.total_income,
        totals.total_expenses,
        totals.balance()
    );
    Ok(())
}

pub async fn add(ctx: &ClientContext, kind: EntryKind, description: &str, amount: f64) -> Result<()> {
    let entry = ctx.budget().add_ledger_entry(kind, description, amount).await?;
    println!("{}", entry.id);
    Ok(())
}

pub async fn remove(ctx: &ClientContext, id: &str) -> Result<()> {
    if !ctx.budget().remove_ledger_entry(id).await? {
        println!("No entry {}", id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("income").unwrap(), EntryKind::Income);
        assert_eq!(parse_kind("expense").unwrap(), EntryKind::Expense);
        assert!(parse_kind("gift").is_err());
    }
}
