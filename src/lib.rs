//! Achievement Ledger
//!
//! Tracks, per player, progress toward a catalog of achievements inside a
//! persistent multiplayer game service: objective progress, completion,
//! prerequisite gating, a score-derived achievement level and the reward
//! claim flow.
//!
//! ## Pieces
//!
//! - [`catalog`]: immutable snapshot of definitions and level thresholds,
//!   loaded from YAML and swapped atomically on reload.
//! - [`progress`]: the player's records, partitioned into incomplete and
//!   completed segments, plus SQLite persistence.
//! - [`engine`]: objective updates, dependency gating, level calculation and
//!   reward claims, talking to the outside world through small traits
//!   (client notifications, scripting, reward approval).

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod progress;

pub use catalog::{AchievementDefinition, AchievementGroup, Catalog, CatalogHandle, LevelThreshold};
pub use engine::{AchievementEngine, ClaimOutcome, LevelProgress, ProgressInfo};
pub use error::AchievementError;
pub use progress::{Player, PlayerAchievement, PlayerProgress, ProgressDb};
