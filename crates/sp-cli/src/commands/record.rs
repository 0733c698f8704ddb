//! Record command: append a transaction to the log.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use sp_core::{CategoryId, Transaction, TransactionId, TransactionKind};
use uuid::Uuid;

use crate::commands::util::resolve_goal;
use crate::store::PlanStore;

pub struct RecordArgs {
    pub amount: f64,
    pub kind: String,
    pub date: Option<NaiveDate>,
    pub goal: Option<String>,
    pub category: Option<String>,
}

pub fn run(store: &PlanStore, args: RecordArgs, today: NaiveDate) -> Result<()> {
    let kind: TransactionKind = args.kind.parse()?;
    let snapshot = store.load()?;

    let goal_id = match (&kind, &args.goal) {
        (TransactionKind::Allocation, Some(reference)) => {
            Some(resolve_goal(&snapshot, reference)?.id.clone())
        }
        (TransactionKind::Allocation, None) => bail!("allocations need --goal"),
        (_, Some(_)) => bail!("only allocations carry a goal"),
        (_, None) => None,
    };

    let category_id = match (&kind, &args.category) {
        (TransactionKind::Expense, Some(category)) => Some(CategoryId::new(category.clone())?),
        (_, Some(_)) => bail!("only expenses carry a category"),
        (_, None) => None,
    };

    let transaction = Transaction {
        id: TransactionId::new(Uuid::new_v4().to_string())
            .context("generated transaction ID was invalid")?,
        goal_id,
        category_id,
        amount: args.amount,
        kind,
        date: args.date.unwrap_or(today),
        deviation: None,
        planned_amount: None,
        actual_amount: None,
        acknowledged: false,
        acknowledged_at: None,
    };

    store.append_transaction(transaction)?;
    println!("Recorded {kind} transaction");
    Ok(())
}
