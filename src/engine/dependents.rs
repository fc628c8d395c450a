//! Prerequisite ("dependent") gating

use super::AchievementEngine;
use crate::catalog::{AchievementDefinition, Catalog};
use crate::progress::{Player, PlayerProgress};

/// Whether every prerequisite of the definition is completed
pub(crate) fn dependents_completed(progress: &PlayerProgress, definition: &AchievementDefinition) -> bool {
    definition
        .dependents
        .iter()
        .all(|dependent| progress.is_completed(*dependent))
}

impl AchievementEngine {
    /// Check whether all prerequisites of an achievement are completed.
    ///
    /// Unknown achievements fail closed.
    pub fn check_dependent(&self, player: &Player, achievement_id: u32) -> bool {
        let catalog = self.catalog.snapshot();
        catalog
            .get(achievement_id)
            .is_some_and(|definition| dependents_completed(&player.progress, definition))
    }

    /// Unlock achievements whose only requirement is their prerequisites.
    ///
    /// Runs after every completion since finishing one achievement can
    /// satisfy the prerequisite list of another.
    pub(crate) fn unlock_dependent_only(&self, catalog: &Catalog, player: &mut Player) {
        for definition in catalog.iter() {
            if !definition.group.unlocks_by_dependents()
                || definition.dependents.is_empty()
                || definition.condition.is_some()
            {
                continue;
            }

            if player.progress.get(definition.id).is_some() {
                continue;
            }

            if !dependents_completed(&player.progress, definition) {
                continue;
            }

            if self.add_with(catalog, player, definition.id).is_ok() {
                if let Err(e) = self.update_achievement_with(catalog, player, definition.id, true) {
                    tracing::debug!("Dependent unlock of achievement {} failed: {}", definition.id, e);
                }
            }
        }
    }
}
