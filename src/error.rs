//! Error types for player-facing achievement operations

/// Reasons an achievement operation was rejected.
///
/// None of these are fatal: callers log them or turn them into a denial
/// sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AchievementError {
    #[error("Achievement {0} not found in catalog")]
    CatalogMiss(u32),

    #[error("Achievement {0} is already tracked")]
    AlreadyTracked(u32),

    #[error("Achievement {0} is not tracked")]
    NotTracked(u32),

    #[error("Achievement {0} is already completed")]
    AlreadyCompleted(u32),

    #[error("Achievement {0} is not completed")]
    NotCompleted(u32),

    #[error("Reward for achievement {0} was already claimed")]
    AlreadyRewarded(u32),

    #[error("Reward claim for achievement {0} is still pending")]
    ClaimPending(u32),

    #[error("Reward claim for achievement {0} was denied")]
    ClaimDenied(u32),
}

impl AchievementError {
    /// Achievement id the error refers to
    pub fn achievement_id(&self) -> u32 {
        match *self {
            Self::CatalogMiss(id)
            | Self::AlreadyTracked(id)
            | Self::NotTracked(id)
            | Self::AlreadyCompleted(id)
            | Self::NotCompleted(id)
            | Self::AlreadyRewarded(id)
            | Self::ClaimPending(id)
            | Self::ClaimDenied(id) => id,
        }
    }
}
