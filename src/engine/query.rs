//! Progress queries used by scripts and admin commands

use super::AchievementEngine;
use crate::catalog::MAX_OBJECTIVES;
use crate::progress::Player;

/// Piece of progress information to look up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressInfo {
    /// Objective counter, 1-based (`Count(1)` is slot 0)
    Count(u8),
    Complete,
    CompleteDate,
    GotReward,
    Level,
    Score,
}

impl ProgressInfo {
    /// Numeric code used by the scripting layer
    pub fn code(&self) -> i32 {
        match self {
            Self::Count(n) => i32::from(*n),
            Self::Complete => 11,
            Self::CompleteDate => 12,
            Self::GotReward => 13,
            Self::Level => 14,
            Self::Score => 15,
        }
    }

    /// Parse a scripting layer code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1..=10 => u8::try_from(code).ok().map(Self::Count),
            11 => Some(Self::Complete),
            12 => Some(Self::CompleteDate),
            13 => Some(Self::GotReward),
            14 => Some(Self::Level),
            15 => Some(Self::Score),
            _ => None,
        }
    }
}

/// Why a progress query has no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProgressQueryError {
    #[error("Player does not track this achievement")]
    NotTracked,

    #[error("Unknown progress information type")]
    InvalidInfo,
}

impl ProgressQueryError {
    /// Value reported to scripts in place of a result
    pub fn sentinel(&self) -> i64 {
        match self {
            Self::NotTracked => -1,
            Self::InvalidInfo => -2,
        }
    }
}

impl AchievementEngine {
    /// Look up one piece of a player's progress
    pub fn check_progress(
        &self,
        player: &Player,
        achievement_id: u32,
        info: ProgressInfo,
    ) -> Result<i64, ProgressQueryError> {
        // Level and score do not depend on the achievement
        match info {
            ProgressInfo::Level => return Ok(i64::from(player.progress.level())),
            ProgressInfo::Score => return Ok(i64::from(player.progress.total_score())),
            _ => {}
        }

        let record = player
            .progress
            .get(achievement_id)
            .ok_or(ProgressQueryError::NotTracked)?;

        match info {
            ProgressInfo::Count(n) if (1..=MAX_OBJECTIVES).contains(&usize::from(n)) => {
                Ok(i64::from(record.counts[usize::from(n) - 1]))
            }
            ProgressInfo::Count(_) => Err(ProgressQueryError::InvalidInfo),
            ProgressInfo::Complete => Ok(i64::from(record.is_completed())),
            ProgressInfo::CompleteDate => Ok(record.completed_at.unwrap_or(0)),
            ProgressInfo::GotReward => Ok(i64::from(record.is_rewarded())),
            ProgressInfo::Level | ProgressInfo::Score => Err(ProgressQueryError::InvalidInfo),
        }
    }

    /// Script-facing variant of [`Self::check_progress`] using raw codes.
    ///
    /// Returns -1 when the achievement is not tracked and -2 for an invalid code.
    pub fn check_progress_code(&self, player: &Player, achievement_id: u32, code: i32) -> i64 {
        let Some(info) = ProgressInfo::from_code(code) else {
            return ProgressQueryError::InvalidInfo.sentinel();
        };
        self.check_progress(player, achievement_id, info)
            .unwrap_or_else(|e| e.sentinel())
    }
}
