//! Init command: create an empty plan file.

use anyhow::{Context, Result};

use crate::store::PlanStore;

pub fn run(store: &PlanStore) -> Result<()> {
    store
        .init()
        .with_context(|| format!("failed to create {}", store.path().display()))?;
    println!("Created empty plan at {}", store.path().display());
    Ok(())
}
