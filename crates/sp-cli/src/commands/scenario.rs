//! Scenario command: add an income scenario.

use anyhow::{Context, Result};
use sp_core::{IncomeScenario, ScenarioId, ScenarioKind};
use uuid::Uuid;

use crate::store::PlanStore;

pub struct AddArgs {
    pub name: String,
    pub income: f64,
    pub tax_rate: f64,
    pub fixed_expenses: f64,
    pub kind: String,
}

pub fn add(store: &PlanStore, args: AddArgs) -> Result<()> {
    let kind: ScenarioKind = args.kind.parse()?;
    let scenario = IncomeScenario {
        id: ScenarioId::new(Uuid::new_v4().to_string())
            .context("generated scenario ID was invalid")?,
        name: args.name,
        monthly_income: args.income,
        tax_rate: args.tax_rate,
        fixed_expenses: args.fixed_expenses,
        kind,
    };
    scenario.validate()?;

    let name = scenario.name.clone();
    store.add_scenario(scenario)?;
    println!("Added {kind} scenario {name:?}");
    Ok(())
}
