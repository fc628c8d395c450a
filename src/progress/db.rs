//! SQLite storage for player achievement progress
//!
//! Progress is written in one transaction per player whenever the dirty flag
//! is set; the periodic checkpoint calls [`ProgressDb::save_if_dirty`].

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use super::store::{PlayerAchievement, PlayerProgress};
use super::Player;
use crate::catalog::MAX_OBJECTIVES;
use crate::config::Config;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS player_achievements (
    char_id INTEGER NOT NULL,
    achievement_id INTEGER NOT NULL,
    counts TEXT NOT NULL DEFAULT '[]',  -- JSON array of objective counters
    completed_at INTEGER,               -- NULL while incomplete
    rewarded_at INTEGER,                -- NULL until the reward was claimed
    score INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (char_id, achievement_id)
);
"#;

/// Database wrapper shared between player contexts
#[derive(Clone)]
pub struct ProgressDb {
    conn: Arc<Mutex<Connection>>,
}

impl ProgressDb {
    /// Open or create the database at the default location (~/.achievement-ledger/progress.db)
    pub fn open_default() -> Result<Self> {
        let db_path = Config::global_config_dir().join("progress.db");
        Self::open(&db_path)
    }

    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create progress dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open progress db: {}", path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory progress db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: index for per-player loads
        if version < 2 {
            conn.execute_batch(
                "CREATE INDEX IF NOT EXISTS idx_player_achievements_char ON player_achievements(char_id);",
            )?;
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        Ok(())
    }

    /// Load a player's stored records.
    ///
    /// Score, level and titles are derived data; the engine rebuilds them
    /// with `AchievementEngine::refresh_player`.
    pub fn load_player(&self, char_id: u32) -> Result<Player> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT achievement_id, counts, completed_at, rewarded_at, score
             FROM player_achievements WHERE char_id = ?1 ORDER BY achievement_id",
        )?;

        let rows = stmt.query_map([char_id], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, Option<i64>>(3)?,
                row.get::<_, u32>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (achievement_id, counts_json, completed_at, rewarded_at, score) = row?;
            let stored: Vec<u32> = serde_json::from_str(&counts_json).with_context(|| {
                format!(
                    "Invalid objective counters for achievement {} of character {}",
                    achievement_id, char_id
                )
            })?;

            let mut counts = [0; MAX_OBJECTIVES];
            for (slot, value) in stored.into_iter().take(MAX_OBJECTIVES).enumerate() {
                counts[slot] = value;
            }

            records.push(PlayerAchievement {
                achievement_id,
                counts,
                // Zero is the "absent" marker of older dumps
                completed_at: completed_at.filter(|at| *at > 0),
                rewarded_at: rewarded_at.filter(|at| *at > 0),
                score,
            });
        }

        tracing::debug!("Loaded {} achievement records for character {}", records.len(), char_id);
        Ok(Player::with_progress(char_id, PlayerProgress::from_records(records)))
    }

    /// Write the player's records if they changed since the last save.
    ///
    /// Returns whether anything was written.
    pub fn save_if_dirty(&self, char_id: u32, progress: &mut PlayerProgress) -> Result<bool> {
        if !progress.is_dirty() {
            return Ok(false);
        }

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM player_achievements WHERE char_id = ?1", [char_id])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO player_achievements
                 (char_id, achievement_id, counts, completed_at, rewarded_at, score)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for record in progress.records() {
                let counts = serde_json::to_string(&record.counts)?;
                insert.execute(params![
                    char_id,
                    record.achievement_id,
                    counts,
                    record.completed_at,
                    record.rewarded_at,
                    record.score,
                ])?;
            }
        }
        tx.commit()
            .with_context(|| format!("Failed to save achievements of character {}", char_id))?;

        progress.clear_dirty();
        tracing::debug!("Saved {} achievement records for character {}", progress.len(), char_id);
        Ok(true)
    }

    /// Remove every stored record of a character
    pub fn delete_player(&self, char_id: u32) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM player_achievements WHERE char_id = ?1", [char_id])?;
        Ok(())
    }
}
