//! Storage layer for the savings planner.
//!
//! The plan lives in one JSON file owned by this process. The engine never
//! touches it: every command loads a snapshot, computes, and writes back
//! through this store.
//!
//! # Atomicity
//!
//! A goal's `current_amount` must equal the sum of its allocation
//! transactions. [`PlanStore::append_transaction`] therefore updates the
//! goal and appends the transaction in the same snapshot and persists them
//! in one write; writes go to a temp file first and are renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use sp_core::{
    AcknowledgedDeviations, FlexEvent, Goal, GoalId, IncomeScenario, Month, PlanSnapshot,
    Transaction, TransactionKind,
};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The plan file does not exist yet.
    #[error("no plan found at {path} (run `sp init` first)")]
    PlanMissing { path: PathBuf },

    /// The plan file exists but should not be overwritten.
    #[error("a plan already exists at {path}")]
    PlanExists { path: PathBuf },

    /// An allocation referenced a goal that is not in the plan.
    #[error("unknown goal: {0}")]
    UnknownGoal(GoalId),

    /// An allocation transaction arrived without a goal to credit.
    #[error("allocation transaction without a goal")]
    AllocationWithoutGoal,

    /// An error from the filesystem.
    #[error("plan file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The plan file is not valid JSON for the current schema.
    #[error("plan file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// File-backed plan store.
pub struct PlanStore {
    path: PathBuf,
}

impl PlanStore {
    /// Creates a store for the plan at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The plan file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty plan file, failing if one already exists.
    pub fn init(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Err(StoreError::PlanExists {
                path: self.path.clone(),
            });
        }
        self.save(&PlanSnapshot::default())
    }

    /// Loads the full snapshot.
    pub fn load(&self) -> Result<PlanSnapshot, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::PlanMissing {
                path: self.path.clone(),
            });
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Persists the snapshot in one write (temp file, then rename).
    pub fn save(&self, snapshot: &PlanSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "plan saved");
        Ok(())
    }

    /// Inserts or replaces a goal by ID.
    pub fn upsert_goal(&self, goal: Goal) -> Result<(), StoreError> {
        let mut snapshot = self.load()?;
        match snapshot.goals.iter_mut().find(|g| g.id == goal.id) {
            Some(existing) => *existing = goal,
            None => snapshot.goals.push(goal),
        }
        self.save(&snapshot)
    }

    /// Adds an income scenario.
    pub fn add_scenario(&self, scenario: IncomeScenario) -> Result<(), StoreError> {
        let mut snapshot = self.load()?;
        snapshot.scenarios.push(scenario);
        self.save(&snapshot)
    }

    /// Adds a flex event.
    pub fn add_flex_event(&self, event: FlexEvent) -> Result<(), StoreError> {
        let mut snapshot = self.load()?;
        snapshot.flex_events.push(event);
        self.save(&snapshot)
    }

    /// Appends a transaction.
    ///
    /// An allocation credits its goal's `current_amount` in the same write,
    /// so the aggregate and the log cannot diverge. The goal must exist.
    pub fn append_transaction(&self, transaction: Transaction) -> Result<(), StoreError> {
        let mut snapshot = self.load()?;

        if transaction.kind == TransactionKind::Allocation {
            let goal_id = transaction
                .goal_id
                .clone()
                .ok_or(StoreError::AllocationWithoutGoal)?;
            let goal = snapshot
                .goals
                .iter_mut()
                .find(|g| g.id == goal_id)
                .ok_or(StoreError::UnknownGoal(goal_id))?;
            goal.current_amount += transaction.amount;
        }

        snapshot.transactions.push(transaction);
        self.save(&snapshot)
    }

    /// Replaces the acknowledged-deviations set.
    pub fn save_acknowledged(
        &self,
        acknowledged: AcknowledgedDeviations,
    ) -> Result<(), StoreError> {
        let mut snapshot = self.load()?;
        snapshot.acknowledged = acknowledged;
        self.save(&snapshot)
    }

    /// Acknowledges one goal-month and persists the updated set.
    pub fn acknowledge_deviation(
        &self,
        goal_id: GoalId,
        month: Month,
    ) -> Result<(), StoreError> {
        let snapshot = self.load()?;
        let updated = snapshot.acknowledged.acknowledge(goal_id, month);
        self.save_acknowledged(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sp_core::{PriorityWeight, TransactionId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> (tempfile::TempDir, PlanStore) {
        let temp = tempfile::tempdir().unwrap();
        let store = PlanStore::new(temp.path().join("plan.json"));
        store.init().unwrap();
        (temp, store)
    }

    fn goal(id: &str) -> Goal {
        Goal {
            id: GoalId::new(id).unwrap(),
            name: id.to_string(),
            target_amount: 10_000.0,
            start_date: Some(date(2025, 1, 1)),
            deadline: date(2026, 1, 1),
            priority: PriorityWeight::default(),
            monthly_contribution: None,
            current_amount: 0.0,
            is_emergency_fund: false,
        }
    }

    fn allocation(id: &str, goal: &str, amount: f64) -> Transaction {
        Transaction {
            id: TransactionId::new(id).unwrap(),
            goal_id: Some(GoalId::new(goal).unwrap()),
            category_id: None,
            amount,
            kind: TransactionKind::Allocation,
            date: date(2025, 2, 10),
            deviation: None,
            planned_amount: None,
            actual_amount: None,
            acknowledged: false,
            acknowledged_at: None,
        }
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let (_temp, store) = store();
        assert!(matches!(
            store.init(),
            Err(StoreError::PlanExists { .. })
        ));
    }

    #[test]
    fn load_without_plan_is_a_clear_error() {
        let temp = tempfile::tempdir().unwrap();
        let store = PlanStore::new(temp.path().join("plan.json"));
        assert!(matches!(store.load(), Err(StoreError::PlanMissing { .. })));
    }

    #[test]
    fn snapshot_roundtrips_through_the_file() {
        let (_temp, store) = store();
        store.upsert_goal(goal("goal-1")).unwrap();

        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.goals.len(), 1);
        assert_eq!(snapshot.goals[0].name, "goal-1");
    }

    #[test]
    fn upsert_replaces_by_id() {
        let (_temp, store) = store();
        store.upsert_goal(goal("goal-1")).unwrap();

        let mut updated = goal("goal-1");
        updated.target_amount = 99_000.0;
        store.upsert_goal(updated).unwrap();

        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.goals.len(), 1);
        assert_eq!(snapshot.goals[0].target_amount, 99_000.0);
    }

    #[test]
    fn allocation_updates_current_amount_once() {
        let (_temp, store) = store();
        store.upsert_goal(goal("goal-1")).unwrap();
        store
            .append_transaction(allocation("tx-1", "goal-1", 750.0))
            .unwrap();

        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.goals[0].current_amount, 750.0);
        assert_eq!(snapshot.transactions.len(), 1);
        // The aggregate matches the log exactly.
        assert_eq!(
            sp_core::allocated_total(&snapshot.goals[0].id, &snapshot.transactions),
            snapshot.goals[0].current_amount
        );
    }

    #[test]
    fn allocation_against_unknown_goal_is_rejected() {
        let (_temp, store) = store();
        assert!(matches!(
            store.append_transaction(allocation("tx-1", "goal-ghost", 10.0)),
            Err(StoreError::UnknownGoal(_))
        ));
        // Nothing was written.
        assert!(store.load().unwrap().transactions.is_empty());
    }

    #[test]
    fn acknowledge_persists_the_updated_set() {
        let (_temp, store) = store();
        let month = Month::new(2025, 2).unwrap();
        let goal_id = GoalId::new("goal-1").unwrap();
        store
            .acknowledge_deviation(goal_id.clone(), month)
            .unwrap();

        let snapshot = store.load().unwrap();
        assert!(snapshot.acknowledged.contains(&goal_id, month));
    }
}
