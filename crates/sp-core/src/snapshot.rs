//! The plain-data snapshot the host hands to the engine.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::deviation::AcknowledgedDeviations;
use crate::flex_event::FlexEvent;
use crate::goal::Goal;
use crate::scenario::IncomeScenario;
use crate::transaction::Transaction;
use crate::types::{EngineWarning, GoalId};

/// Everything the engine needs for one computation.
///
/// The host owns storage and sequencing; it loads a consistent snapshot,
/// calls engine functions against it, persists whatever it decides to keep,
/// and re-invokes the engine with the updated snapshot. The engine never
/// sees the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanSnapshot {
    /// All goals.
    #[serde(default)]
    pub goals: Vec<Goal>,

    /// All income scenarios.
    #[serde(default)]
    pub scenarios: Vec<IncomeScenario>,

    /// The full transaction log.
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    /// Declared flex events.
    #[serde(default)]
    pub flex_events: Vec<FlexEvent>,

    /// Acknowledged deviation goal-months.
    #[serde(default)]
    pub acknowledged: AcknowledgedDeviations,
}

impl PlanSnapshot {
    /// Looks up a goal by ID.
    pub fn goal(&self, id: &GoalId) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == *id)
    }

    /// Looks up an income scenario by name (case-insensitive).
    pub fn scenario_named(&self, name: &str) -> Option<&IncomeScenario> {
        self.scenarios
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Transactions and flex events pointing at goals that do not exist.
    ///
    /// Computations skip such references; this reports them so the host can
    /// surface them without failing the whole run.
    pub fn dangling_references(&self) -> Vec<EngineWarning> {
        let known: BTreeSet<&GoalId> = self.goals.iter().map(|g| &g.id).collect();
        let mut warnings = Vec::new();

        for tx in &self.transactions {
            if let Some(goal_id) = &tx.goal_id {
                if !known.contains(goal_id) {
                    warnings.push(EngineWarning::UnknownGoalInTransaction {
                        transaction_id: tx.id.clone(),
                        goal_id: goal_id.clone(),
                    });
                }
            }
        }

        for event in &self.flex_events {
            for goal_id in &event.affected_goals {
                if !known.contains(goal_id) {
                    warnings.push(EngineWarning::UnknownGoalInFlexEvent {
                        event_id: event.id.clone(),
                        goal_id: goal_id.clone(),
                    });
                }
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_deserializes_from_empty_object() {
        let snapshot: PlanSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.goals.is_empty());
        assert!(snapshot.transactions.is_empty());
        assert!(snapshot.acknowledged.is_empty());
    }

    #[test]
    fn dangling_transaction_reference_is_reported() {
        use crate::transaction::TransactionKind;
        use crate::types::TransactionId;
        use chrono::NaiveDate;

        let snapshot = PlanSnapshot {
            transactions: vec![Transaction {
                id: TransactionId::new("tx-1").unwrap(),
                goal_id: Some(GoalId::new("goal-ghost").unwrap()),
                category_id: None,
                amount: 100.0,
                kind: TransactionKind::Allocation,
                date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
                deviation: None,
                planned_amount: None,
                actual_amount: None,
                acknowledged: false,
                acknowledged_at: None,
            }],
            ..PlanSnapshot::default()
        };

        let warnings = snapshot.dangling_references();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_string().contains("goal-ghost"));
    }

    #[test]
    fn scenario_lookup_is_case_insensitive() {
        use crate::scenario::ScenarioKind;
        use crate::types::ScenarioId;

        let snapshot = PlanSnapshot {
            scenarios: vec![IncomeScenario {
                id: ScenarioId::new("scenario-1").unwrap(),
                name: "Expected".to_string(),
                monthly_income: 1_000.0,
                tax_rate: 0.0,
                fixed_expenses: 0.0,
                kind: ScenarioKind::Expected,
            }],
            ..PlanSnapshot::default()
        };

        assert!(snapshot.scenario_named("expected").is_some());
        assert!(snapshot.scenario_named("Conservative").is_none());
    }
}
