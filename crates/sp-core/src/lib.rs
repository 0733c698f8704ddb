//! Allocation & plan-health engine for the savings planner.
//!
//! This crate contains the rules that turn (goals, income, transaction
//! history) into (allocations, deviations, consequences, health):
//! - Auto-split: dividing net income across goals under priority and
//!   emergency-fund rules
//! - Deviation detection: planned-versus-actual contribution gaps per month
//! - Consequence projection: what a shortfall does to a goal's schedule
//! - Plan health: one composite status for the whole plan
//!
//! The engine is pure, synchronous, and stateless between calls: every
//! function takes an explicit snapshot of goals, scenarios, and
//! transactions and returns plain data. Callers own storage and the
//! concurrency around it; nothing here performs I/O.

pub mod autosplit;
pub mod consequence;
pub mod contribution;
pub mod deviation;
pub mod flex_event;
pub mod goal;
pub mod health;
pub mod rebalance;
pub mod scenario;
pub mod snapshot;
pub mod timeline;
pub mod transaction;
pub mod types;

pub use autosplit::{
    Allocation, AllocationKind, AutoSplitResult, EMERGENCY_PRIORITY_FLOOR, EMERGENCY_SHARE,
    FLEX_FACTOR, calculate_auto_split,
};
pub use consequence::{
    AffectedGoal, ConsequenceProjection, DEFAULT_CATCH_UP_TOLERANCE, GoalImpact,
    calculate_consequence,
};
pub use contribution::{
    RequiredContribution, contribution_schedule, planned_for_month, portfolio_required_monthly,
    required_monthly,
};
pub use deviation::{AcknowledgedDeviations, Deviation, detect_deviations};
pub use flex_event::{AdjustedAllocation, FlexEvent, RebalancingPlan};
pub use goal::Goal;
pub use health::{HealthStatus, PlanHealth, calculate_plan_health, slack_months};
pub use rebalance::{AllocationOverrides, apply_overrides, rebalance_for_flex_event};
pub use scenario::{IncomeScenario, ScenarioKind};
pub use snapshot::PlanSnapshot;
pub use timeline::Month;
pub use transaction::{
    DeviationKind, Transaction, TransactionKind, allocated_in_month, allocated_total,
};
pub use types::{
    CategoryId, EngineError, EngineWarning, FlexEventId, GoalId, PriorityWeight, ScenarioId,
    TransactionId, ValidationError,
};
