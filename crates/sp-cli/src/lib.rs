//! Savings planner CLI library.
//!
//! This crate is the host around the engine: it owns the plan file, loads
//! snapshots, calls `sp-core`, and renders the results. No allocation or
//! health math lives here.

mod cli;
pub mod commands;
mod config;
mod store;

pub use cli::{Cli, Commands, GoalAction};
pub use config::Config;
pub use store::{PlanStore, StoreError};
