//! Achievement and statistics command handlers

use anyhow::{Context, Result};

use slambook_core::Store;

use crate::output::Output;

/// Check for new unlocks and list every achievement
pub fn list(store: &mut Store, output: &Output) -> Result<()> {
    let report = store
        .check_achievements()
        .context("Failed to check achievements")?;
    let progress = store.achievement_progress()?;

    output.announce_unlocks(&report);
    if !output.is_json() && !report.newly_unlocked.is_empty() {
        println!();
    }
    output.print_achievements(&report, &progress);
    Ok(())
}

/// Show aggregate statistics
pub fn stats(store: &Store, output: &Output) -> Result<()> {
    let stats = store.stats()?;
    output.print_stats(&stats);
    Ok(())
}
