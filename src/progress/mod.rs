//! Player-owned achievement state and its persistence

mod db;
mod store;

pub use db::ProgressDb;
pub use store::{PlayerAchievement, PlayerProgress};

use std::collections::BTreeSet;

/// Achievement state of one connected player.
///
/// Owned by that player's processing context; every engine operation takes
/// it by `&mut`, so events for one player are serialized by construction.
#[derive(Debug, Clone, Default)]
pub struct Player {
    pub char_id: u32,
    pub progress: PlayerProgress,
    /// Unlocked title ids
    pub titles: Vec<u32>,
    /// Reward claims waiting for the authority's answer (never persisted)
    pending_rewards: BTreeSet<u32>,
}

impl Player {
    pub fn new(char_id: u32) -> Self {
        Self {
            char_id,
            ..Self::default()
        }
    }

    pub fn with_progress(char_id: u32, progress: PlayerProgress) -> Self {
        Self {
            char_id,
            progress,
            ..Self::default()
        }
    }

    /// Whether a reward claim for this achievement is awaiting approval
    pub fn has_pending_reward(&self, achievement_id: u32) -> bool {
        self.pending_rewards.contains(&achievement_id)
    }

    pub(crate) fn begin_reward_claim(&mut self, achievement_id: u32) {
        self.pending_rewards.insert(achievement_id);
    }

    pub(crate) fn finish_reward_claim(&mut self, achievement_id: u32) -> bool {
        self.pending_rewards.remove(&achievement_id)
    }

    pub(crate) fn clear_pending_rewards(&mut self) {
        self.pending_rewards.clear();
    }
}
