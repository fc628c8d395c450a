//! Init command implementation

use std::path::Path;

use anyhow::Result;

use achievement_ledger::config::Config;

/// Write a default config file
pub fn init_command(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::global_config_path);

    if path.exists() && !force {
        eprintln!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }

    Config::default().save_to_file(&path)?;
    println!("Created {}", path.display());
    Ok(())
}
