//! CLI command implementations

pub mod check;
pub mod init;
pub mod level;
pub mod replay;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use achievement_ledger::Catalog;
use achievement_ledger::config::Config;

/// Config plus the directory its relative paths resolve against
pub struct Loaded {
    pub config: Config,
    pub base: PathBuf,
}

impl Loaded {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load(config_path)?;
        let base = Config::base_dir(config_path);
        Ok(Self { config, base })
    }

    pub fn catalog(&self) -> Result<Catalog> {
        let definitions = self.config.catalog_path(&self.base);
        let levels = self.config.levels_path(&self.base);
        Catalog::load(&definitions, &levels).with_context(|| {
            format!(
                "Failed to load catalog from {} and {}",
                definitions.display(),
                levels.display()
            )
        })
    }
}
