//! Achievement level calculation
//!
//! The level is derived from the total score of completed achievements and
//! never stored independently of it.

use super::AchievementEngine;
use crate::catalog::{AchievementGroup, Catalog, LevelThreshold};
use crate::progress::Player;

/// Level and the two numbers shown on the client's level bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelProgress {
    pub level: u16,
    /// Points earned inside the current level
    pub progress: u32,
    /// Points the current level spans (0 past the last defined level)
    pub to_next: u32,
}

/// Calculate level for a total score.
///
/// A level is passed once the score strictly exceeds its threshold. Scores
/// beyond the last threshold are shown one level past the table.
pub fn compute_level(total_score: u32, levels: &[LevelThreshold]) -> LevelProgress {
    if levels.is_empty() {
        return LevelProgress {
            level: 0,
            progress: total_score,
            to_next: 0,
        };
    }

    let mut level = 0usize;
    loop {
        let threshold = levels[level].points;

        if total_score > threshold {
            if level + 1 < levels.len() {
                level += 1;
                continue;
            }
            return LevelProgress {
                level: to_level(level + 1),
                progress: total_score - threshold,
                to_next: 0,
            };
        }

        if level == 0 {
            return LevelProgress {
                level: 0,
                progress: total_score,
                to_next: threshold,
            };
        }

        let previous = levels[level - 1].points;
        return LevelProgress {
            level: to_level(level),
            progress: total_score.saturating_sub(previous),
            to_next: threshold.saturating_sub(previous),
        };
    }
}

fn to_level(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}

impl AchievementEngine {
    /// Current level of the player, recalculated from completed records
    pub fn get_level(&self, player: &mut Player) -> LevelProgress {
        let catalog = self.catalog.snapshot();
        self.recompute_with(&catalog, player, false)
    }

    /// Recount total score and level.
    ///
    /// With `grant_goal`, a level change raises a goal-level event so that
    /// reaching a level can itself unlock achievements.
    pub(crate) fn recompute_with(
        &self,
        catalog: &Catalog,
        player: &mut Player,
        grant_goal: bool,
    ) -> LevelProgress {
        let total_score = player.progress.completed_score();
        let old_level = player.progress.level();

        if catalog.levels().is_empty() {
            tracing::warn!("No achievement levels defined, level stays at 0");
        }
        let result = compute_level(total_score, catalog.levels());
        player.progress.set_totals(total_score, result.level);

        if grant_goal && old_level != result.level {
            tracing::info!(
                "Character {} achievement level {} -> {}",
                player.char_id,
                old_level,
                result.level
            );
            self.update_objective_with(catalog, player, AchievementGroup::GoalLevel, &[0]);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(points: &[u32]) -> Vec<LevelThreshold> {
        points
            .iter()
            .enumerate()
            .map(|(level, points)| LevelThreshold {
                level: level as u16,
                points: *points,
            })
            .collect()
    }

    #[test]
    fn test_level_between_thresholds() {
        let levels = table(&[100, 300]);
        assert_eq!(
            compute_level(250, &levels),
            LevelProgress {
                level: 1,
                progress: 150,
                to_next: 200
            }
        );
    }

    #[test]
    fn test_level_zero() {
        let levels = table(&[100, 300]);
        assert_eq!(
            compute_level(40, &levels),
            LevelProgress {
                level: 0,
                progress: 40,
                to_next: 100
            }
        );
        // Reaching a threshold exactly does not pass the level
        assert_eq!(compute_level(100, &levels).level, 0);
        assert_eq!(compute_level(101, &levels).level, 1);
    }

    #[test]
    fn test_beyond_last_level() {
        let levels = table(&[100, 300]);
        assert_eq!(
            compute_level(450, &levels),
            LevelProgress {
                level: 2,
                progress: 150,
                to_next: 0
            }
        );
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(
            compute_level(70, &[]),
            LevelProgress {
                level: 0,
                progress: 70,
                to_next: 0
            }
        );
    }

    #[test]
    fn test_level_is_monotonic() {
        let levels = table(&[18, 36, 60, 90, 125, 165, 210]);
        let mut previous = compute_level(0, &levels);
        for score in 1..400 {
            let current = compute_level(score, &levels);
            assert!(current.level >= previous.level, "score {}", score);
            if current.to_next > 0 {
                assert!(current.progress <= current.to_next, "score {}", score);
            } else {
                assert_eq!(current.level as usize, levels.len());
            }
            previous = current;
        }
    }
}
