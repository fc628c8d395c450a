//! Configuration file I/O operations

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::{Config, Settings};

impl Config {
    /// Get the global config directory path (~/.achievement-ledger/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".achievement-ledger")
    }

    /// Get the global config file path (~/.achievement-ledger/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from `path`, or the global location when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::global_config_path);

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    /// Save configuration to a file with atomic write and file locking
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        write_locked(path, content.as_bytes())
    }

    /// Directory relative settings paths resolve against
    pub fn base_dir(config_path: Option<&Path>) -> PathBuf {
        config_path
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::global_config_dir)
    }

    pub fn catalog_path(&self, base: &Path) -> PathBuf {
        Settings::resolve(base, &self.settings.catalog)
    }

    pub fn levels_path(&self, base: &Path) -> PathBuf {
        Settings::resolve(base, &self.settings.levels)
    }

    pub fn database_path(&self, base: &Path) -> PathBuf {
        Settings::resolve(base, &self.settings.database)
    }
}

/// Replace `path` with `content` while holding `<path>.lock`.
///
/// Readers never see a partial file: the bytes go to a sibling temp file
/// that is renamed over the target.
fn write_locked(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

    let lock = File::create(sibling(path, "lock"))
        .with_context(|| format!("Failed to open config lock for {}", path.display()))?;
    lock.lock_exclusive().context("Failed to acquire config lock")?;

    let staged = sibling(path, "tmp");
    let result = File::create(&staged)
        .and_then(|mut file| {
            file.write_all(content)?;
            file.sync_all()
        })
        .and_then(|()| std::fs::rename(&staged, path));

    if result.is_err() {
        let _ = std::fs::remove_file(&staged);
    }
    let _ = FileExt::unlock(&lock);

    result.with_context(|| format!("Failed to write config file: {}", path.display()))
}

/// `config.toml` -> `config.toml.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
