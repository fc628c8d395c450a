//! Check command implementation

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use super::Loaded;

/// Load the catalog and print what it contains
pub fn check_command(config_path: Option<&Path>) -> Result<()> {
    let loaded = Loaded::load(config_path)?;
    let catalog = loaded.catalog()?;

    if !loaded.config.settings.enabled {
        println!("Note: achievements are disabled in the config.");
    }

    println!("Achievements: {}", catalog.len());

    let mut per_group: BTreeMap<&'static str, usize> = BTreeMap::new();
    for definition in catalog.iter() {
        *per_group.entry(definition.group.as_str()).or_default() += 1;
    }
    for (group, count) in per_group {
        println!("  {:<16} {}", group, count);
    }

    let with_dependents = catalog
        .iter()
        .filter(|definition| !definition.dependents.is_empty())
        .count();
    let with_rewards = catalog
        .iter()
        .filter(|definition| !definition.reward.is_empty())
        .count();
    println!("With prerequisites: {}", with_dependents);
    println!("With rewards: {}", with_rewards);

    let levels = catalog.levels();
    match levels.last() {
        Some(last) => println!(
            "Levels: {} (final threshold {} points)",
            levels.len(),
            last.points
        ),
        None => println!("Levels: none defined"),
    }

    Ok(())
}
