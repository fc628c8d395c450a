//! Achievement engine - core progress logic
//!
//! Handles objective updates, dependency gating, level calculation and the
//! reward claim flow. The engine itself holds no player state: every
//! operation receives the player's [`Player`] by `&mut` and one catalog
//! snapshot is used for the whole operation, including any completions it
//! cascades into.

mod dependents;
mod hooks;
mod level;
mod objectives;
mod query;
mod reward;

pub use hooks::{
    ChannelAuthority, ClientNotifier, EventArgs, LocalAuthority, RewardAuthority, RewardDecision,
    RewardRequest, ScriptRuntime,
};
pub use level::{LevelProgress, compute_level};
pub use query::{ProgressInfo, ProgressQueryError};
pub use reward::ClaimOutcome;

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogHandle};
use crate::error::AchievementError;
use crate::progress::{Player, PlayerAchievement};

/// Source of timestamps (seconds since the epoch)
pub type Clock = fn() -> i64;

fn system_clock() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Main entry point for all achievement operations
#[derive(Clone)]
pub struct AchievementEngine {
    catalog: CatalogHandle,
    notifier: Arc<dyn ClientNotifier>,
    scripts: Arc<dyn ScriptRuntime>,
    authority: Arc<dyn RewardAuthority>,
    /// Global feature switch
    enabled: bool,
    clock: Clock,
}

impl AchievementEngine {
    pub fn new(
        catalog: CatalogHandle,
        notifier: Arc<dyn ClientNotifier>,
        scripts: Arc<dyn ScriptRuntime>,
        authority: Arc<dyn RewardAuthority>,
    ) -> Self {
        Self {
            catalog,
            notifier,
            scripts,
            authority,
            enabled: true,
            clock: system_clock,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    /// Replace the catalog snapshot.
    ///
    /// Must not run while events are being processed; players keep their
    /// records and copied scores.
    pub fn reload_catalog(&self, catalog: Catalog) {
        if !self.enabled {
            return;
        }
        let count = catalog.len();
        self.catalog.replace(catalog);
        tracing::info!("Achievement catalog reloaded ({} definitions)", count);
    }

    // ========================================
    // PROGRESS STORE OPERATIONS
    // ========================================

    /// Start tracking an achievement for the player
    pub fn add_achievement(
        &self,
        player: &mut Player,
        achievement_id: u32,
    ) -> Result<PlayerAchievement, AchievementError> {
        let catalog = self.catalog.snapshot();
        self.add_with(&catalog, player, achievement_id).cloned()
    }

    /// Stop tracking an achievement (administrative delete)
    pub fn remove_achievement(
        &self,
        player: &mut Player,
        achievement_id: u32,
    ) -> Result<(), AchievementError> {
        let catalog = self.catalog.snapshot();
        if !catalog.contains(achievement_id) {
            tracing::error!("Cannot remove achievement {}: not found in catalog", achievement_id);
            return Err(AchievementError::CatalogMiss(achievement_id));
        }

        let Some(removed) = player.progress.remove(achievement_id) else {
            tracing::error!(
                "Character {} doesn't have achievement {}",
                player.char_id,
                achievement_id
            );
            return Err(AchievementError::NotTracked(achievement_id));
        };

        if removed.is_completed() {
            self.recompute_with(&catalog, player, false);
        }

        // The client drops a record when it receives a zeroed one
        let placeholder = PlayerAchievement::new(achievement_id, 0);
        self.notifier.achievement_update(
            player.char_id,
            &placeholder,
            player.progress.completed_count(),
        );
        Ok(())
    }

    /// Complete a tracked achievement regardless of its objectives
    pub fn complete_achievement(
        &self,
        player: &mut Player,
        achievement_id: u32,
    ) -> Result<(), AchievementError> {
        let catalog = self.catalog.snapshot();
        self.update_achievement_with(&catalog, player, achievement_id, true)
    }

    /// Rebuild derived state after loading a player from storage
    pub fn refresh_player(&self, player: &mut Player) -> LevelProgress {
        let catalog = self.catalog.snapshot();
        let level = self.recompute_with(&catalog, player, false);
        Self::collect_titles_with(&catalog, player);
        level
    }

    /// Drop all achievement state of a player leaving the game
    pub fn free_player_progress(&self, player: &mut Player) {
        player.progress.clear();
        player.titles.clear();
        player.clear_pending_rewards();
    }

    pub(crate) fn add_with<'p>(
        &self,
        catalog: &Catalog,
        player: &'p mut Player,
        achievement_id: u32,
    ) -> Result<&'p PlayerAchievement, AchievementError> {
        let Some(definition) = catalog.get(achievement_id) else {
            tracing::error!("Cannot add achievement {}: not found in catalog", achievement_id);
            return Err(AchievementError::CatalogMiss(achievement_id));
        };

        if !player.progress.insert(achievement_id, definition.score) {
            tracing::error!(
                "Character {} already has achievement {}",
                player.char_id,
                achievement_id
            );
            return Err(AchievementError::AlreadyTracked(achievement_id));
        }

        let completed = player.progress.completed_count();
        let record = player
            .progress
            .get(achievement_id)
            .ok_or(AchievementError::NotTracked(achievement_id))?;
        self.notifier.achievement_update(player.char_id, record, completed);
        Ok(record)
    }

    /// Push an incomplete record to the client, completing it first if asked.
    ///
    /// Completion recalculates the level and unlocks achievements that only
    /// waited for this one.
    pub(crate) fn update_achievement_with(
        &self,
        catalog: &Catalog,
        player: &mut Player,
        achievement_id: u32,
        complete: bool,
    ) -> Result<(), AchievementError> {
        let Some(definition) = catalog.get(achievement_id) else {
            return Err(AchievementError::CatalogMiss(achievement_id));
        };

        match player.progress.get(achievement_id) {
            None => return Err(AchievementError::NotTracked(achievement_id)),
            Some(record) if record.is_completed() => {
                return Err(AchievementError::AlreadyCompleted(achievement_id));
            }
            Some(_) => {}
        }

        if complete {
            player.progress.complete(definition, (self.clock)());
            tracing::debug!(
                "Character {} completed achievement {}",
                player.char_id,
                achievement_id
            );
            self.recompute_with(catalog, player, true);
            self.unlock_dependent_only(catalog, player);
        }

        player.progress.mark_dirty();

        // Positions changed during the cascade, resolve the record again
        let completed = player.progress.completed_count();
        match player.progress.get(achievement_id) {
            Some(record) => {
                self.notifier.achievement_update(player.char_id, record, completed);
                Ok(())
            }
            None => {
                debug_assert!(false, "achievement {} vanished during update", achievement_id);
                Err(AchievementError::NotTracked(achievement_id))
            }
        }
    }
}
