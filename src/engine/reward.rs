//! Reward claims
//!
//! A completed achievement moves through `claim_reward` (validation and a
//! request to the reward authority) to `get_reward` (the authority's
//! answer). Either step may finish the grant, depending on whether the
//! authority answers immediately.

use super::AchievementEngine;
use super::hooks::RewardDecision;
use crate::catalog::{AchievementDefinition, Catalog};
use crate::error::AchievementError;
use crate::progress::Player;

/// Result of a successful claim request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Reward granted during the call
    Granted,
    /// Waiting for the authority's answer
    Pending,
}

impl AchievementEngine {
    /// Player asks for an achievement's reward.
    ///
    /// Every rejection is also reported to the client as a denied ack.
    pub fn claim_reward(
        &self,
        player: &mut Player,
        achievement_id: u32,
    ) -> Result<ClaimOutcome, AchievementError> {
        let catalog = self.catalog.snapshot();
        let result = self.request_reward(&catalog, player, achievement_id);

        if let Err(e) = &result {
            tracing::debug!(
                "Reward claim of character {} rejected: {}",
                player.char_id,
                e
            );
            self.notifier.reward_ack(player.char_id, false, achievement_id);
        }
        result
    }

    fn request_reward(
        &self,
        catalog: &Catalog,
        player: &mut Player,
        achievement_id: u32,
    ) -> Result<ClaimOutcome, AchievementError> {
        let Some(definition) = catalog.get(achievement_id) else {
            tracing::error!("Trying to reward achievement {} not found in catalog", achievement_id);
            return Err(AchievementError::CatalogMiss(achievement_id));
        };

        let record = player
            .progress
            .get(achievement_id)
            .ok_or(AchievementError::NotTracked(achievement_id))?;
        if record.is_rewarded() {
            return Err(AchievementError::AlreadyRewarded(achievement_id));
        }
        if !record.is_completed() {
            return Err(AchievementError::NotCompleted(achievement_id));
        }
        if player.has_pending_reward(achievement_id) {
            return Err(AchievementError::ClaimPending(achievement_id));
        }

        match self
            .authority
            .request_reward_approval(player.char_id, definition)
        {
            RewardDecision::Approved(rewarded_at) if rewarded_at != 0 => {
                self.grant_reward(definition, player, rewarded_at)?;
                Ok(ClaimOutcome::Granted)
            }
            RewardDecision::Pending => {
                player.begin_reward_claim(achievement_id);
                Ok(ClaimOutcome::Pending)
            }
            RewardDecision::Approved(_) | RewardDecision::Denied => {
                Err(AchievementError::ClaimDenied(achievement_id))
            }
        }
    }

    /// Authority's answer to a pending claim; `rewarded_at == 0` is a denial
    pub fn get_reward(
        &self,
        player: &mut Player,
        achievement_id: u32,
        rewarded_at: i64,
    ) -> Result<(), AchievementError> {
        let catalog = self.catalog.snapshot();
        let Some(definition) = catalog.get(achievement_id) else {
            tracing::error!(
                "Reward authority sent a claim for achievement {} not found in catalog",
                achievement_id
            );
            return Err(AchievementError::CatalogMiss(achievement_id));
        };

        player.finish_reward_claim(achievement_id);

        if rewarded_at == 0 {
            self.notifier.reward_ack(player.char_id, false, achievement_id);
            return Err(AchievementError::ClaimDenied(achievement_id));
        }

        self.grant_reward(definition, player, rewarded_at)
    }

    fn grant_reward(
        &self,
        definition: &AchievementDefinition,
        player: &mut Player,
        rewarded_at: i64,
    ) -> Result<(), AchievementError> {
        let achievement_id = definition.id;
        match player.progress.get(achievement_id) {
            None => return Err(AchievementError::NotTracked(achievement_id)),
            Some(record) if record.is_rewarded() => {
                return Err(AchievementError::AlreadyRewarded(achievement_id));
            }
            Some(record) if !record.is_completed() => {
                return Err(AchievementError::NotCompleted(achievement_id));
            }
            Some(_) => {}
        }

        player.progress.set_rewarded(achievement_id, rewarded_at);

        if let Some(script) = &definition.reward.script {
            self.scripts.run_script(script, player);
        }

        if let Some(title_id) = definition.reward.title_id {
            player.titles.push(title_id);
            self.notifier.achievement_list(player);
        } else {
            self.notifier.reward_ack(player.char_id, true, achievement_id);
            let completed = player.progress.completed_count();
            if let Some(record) = player.progress.get(achievement_id) {
                self.notifier.achievement_update(player.char_id, record, completed);
            }
        }

        tracing::debug!(
            "Character {} received the reward of achievement {}",
            player.char_id,
            achievement_id
        );
        Ok(())
    }

    /// Rebuild the unlocked title list from completed achievements
    pub fn collect_titles(&self, player: &mut Player) {
        let catalog = self.catalog.snapshot();
        Self::collect_titles_with(&catalog, player);
    }

    pub(crate) fn collect_titles_with(catalog: &Catalog, player: &mut Player) {
        player.titles = player
            .progress
            .completed()
            .iter()
            .filter_map(|record| catalog.get(record.achievement_id))
            .filter_map(|definition| definition.reward.title_id)
            .collect();
    }
}
