//! Configuration loading and management

mod io;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub settings: Settings,
}

/// General settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Global achievement feature switch
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Achievement definition file (relative paths resolve against the config dir)
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,

    /// Level threshold file
    #[serde(default = "default_levels")]
    pub levels: PathBuf,

    /// SQLite progress database
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

fn default_enabled() -> bool {
    true
}

fn default_catalog() -> PathBuf {
    PathBuf::from("db/achievement_db.yml")
}

fn default_levels() -> PathBuf {
    PathBuf::from("db/achievement_level_db.yml")
}

fn default_database() -> PathBuf {
    PathBuf::from("progress.db")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            catalog: default_catalog(),
            levels: default_levels(),
            database: default_database(),
        }
    }
}

impl Settings {
    /// Resolve a configured path against a base directory
    pub fn resolve(base: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }
}
