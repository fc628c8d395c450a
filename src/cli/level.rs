//! Level command implementation

use std::path::Path;

use anyhow::Result;

use achievement_ledger::engine::compute_level;

use super::Loaded;

/// Print the level reached with a total score
pub fn level_command(config_path: Option<&Path>, score: u32) -> Result<()> {
    let loaded = Loaded::load(config_path)?;
    let catalog = loaded.catalog()?;

    let level = compute_level(score, catalog.levels());
    if level.to_next == 0 {
        println!(
            "Score {} -> level {} (max, {} points past the final threshold)",
            score,
            level.level,
            level.progress
        );
    } else {
        println!(
            "Score {} -> level {} ({}/{})",
            score,
            level.level,
            level.progress,
            level.to_next
        );
    }

    Ok(())
}
