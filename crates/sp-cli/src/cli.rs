//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Goal-based savings planner.
///
/// Define goals and income scenarios, record transactions, and let the
/// engine split income, flag deviations, project consequences, and score
/// the plan's health.
#[derive(Debug, Parser)]
#[command(name = "sp", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Reference date for schedule math (defaults to the current date).
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an empty plan file.
    Init,

    /// Manage savings goals.
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Add an income scenario.
    Scenario {
        /// Scenario name.
        #[arg(long)]
        name: String,

        /// Expected gross monthly income.
        #[arg(long)]
        income: f64,

        /// Tax rate in percent (0-100).
        #[arg(long)]
        tax_rate: f64,

        /// Fixed monthly expenses deducted after tax.
        #[arg(long, default_value_t = 0.0)]
        fixed_expenses: f64,

        /// Scenario type: conservative, expected, or optimistic.
        #[arg(long, default_value = "expected")]
        kind: String,
    },

    /// Record a transaction.
    Record {
        /// Amount moved.
        #[arg(long)]
        amount: f64,

        /// Transaction type: income, expense, or allocation.
        #[arg(long)]
        kind: String,

        /// Transaction date (defaults to today).
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,

        /// Goal to credit (required for allocations).
        #[arg(long)]
        goal: Option<String>,

        /// Spending category (expenses only).
        #[arg(long)]
        category: Option<String>,
    },

    /// Split an income figure across goals.
    Split {
        /// Gross income to split.
        #[arg(long)]
        income: f64,

        /// Income scenario name; without one the figure is treated as net.
        #[arg(long)]
        scenario: Option<String>,

        /// Ignore active flex events.
        #[arg(long)]
        no_flex: bool,

        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Detect contribution deviations for a month.
    Deviations {
        /// Year to inspect.
        #[arg(long)]
        year: i32,

        /// Month to inspect (1-12).
        #[arg(long)]
        month: u32,

        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Acknowledge one goal-month deviation.
    Ack {
        /// Goal ID.
        #[arg(long)]
        goal: String,

        /// Year of the deviation.
        #[arg(long)]
        year: i32,

        /// Month of the deviation (1-12).
        #[arg(long)]
        month: u32,
    },

    /// Project the consequence of a shortfall.
    Consequence {
        /// Goal ID.
        #[arg(long)]
        goal: String,

        /// Shortfall amount.
        #[arg(long)]
        shortfall: f64,

        /// Year the shortfall occurred.
        #[arg(long)]
        year: i32,

        /// Month the shortfall occurred (1-12).
        #[arg(long)]
        month: u32,

        /// Catch-up tolerance multiplier on the declared contribution.
        #[arg(long, default_value_t = sp_core::DEFAULT_CATCH_UP_TOLERANCE)]
        tolerance: f64,

        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Declare a flex event.
    Flex {
        /// Event date.
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: NaiveDate,

        /// Why the event happened.
        #[arg(long)]
        reason: String,

        /// Money involved.
        #[arg(long)]
        amount: f64,

        /// Goal IDs the event touches (repeatable).
        #[arg(long = "affects", value_name = "GOAL_ID")]
        affected: Vec<String>,

        /// Goal IDs to pause (repeatable, must be affected).
        #[arg(long = "pause", value_name = "GOAL_ID")]
        paused: Vec<String>,

        /// Allocation overrides as GOAL_ID=AMOUNT (repeatable).
        #[arg(long = "adjust", value_name = "GOAL_ID=AMOUNT", value_parser = parse_adjustment)]
        adjusted: Vec<(String, f64)>,

        /// When paused goals resume.
        #[arg(long, value_name = "YYYY-MM-DD")]
        resume: Option<NaiveDate>,
    },

    /// Score the overall plan health.
    Health {
        /// Gross income for the efficiency figure (optional).
        #[arg(long)]
        income: Option<f64>,

        /// Income scenario name used with --income.
        #[arg(long)]
        scenario: Option<String>,

        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

/// Actions on goals.
#[derive(Debug, Subcommand)]
pub enum GoalAction {
    /// Add a goal.
    Add {
        /// Human-readable name.
        #[arg(long)]
        name: String,

        /// Amount to save. Must be positive.
        #[arg(long)]
        target: f64,

        /// When the target must be reached.
        #[arg(long, value_name = "YYYY-MM-DD")]
        deadline: NaiveDate,

        /// When contributions begin (defaults to today at evaluation time).
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<NaiveDate>,

        /// Funding priority, 1-10 (higher is funded first).
        #[arg(long, default_value_t = 5)]
        priority: u8,

        /// Fixed monthly contribution.
        #[arg(long)]
        monthly: Option<f64>,

        /// Mark the goal as the emergency fund.
        #[arg(long)]
        emergency: bool,
    },

    /// List goals with their schedules.
    List {
        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

/// Parses a `GOAL_ID=AMOUNT` adjustment.
fn parse_adjustment(raw: &str) -> Result<(String, f64), String> {
    let (goal, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected GOAL_ID=AMOUNT, got {raw}"))?;
    if goal.is_empty() {
        return Err(format!("expected GOAL_ID=AMOUNT, got {raw}"));
    }
    let amount: f64 = amount
        .parse()
        .map_err(|_| format!("invalid amount in {raw}"))?;
    Ok((goal.to_string(), amount))
}
