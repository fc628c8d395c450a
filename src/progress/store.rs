//! Per-player achievement records
//!
//! Records live in one vector split by a boundary index: `[0, incomplete)`
//! holds incomplete records, `[incomplete, len)` holds completed ones. Order
//! inside each segment is unspecified and changes on mutation, so callers
//! always address records by achievement id, never by position.

use serde::{Deserialize, Serialize};

use crate::catalog::{AchievementDefinition, MAX_OBJECTIVES};

/// A player's progress on one achievement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAchievement {
    pub achievement_id: u32,
    /// Per-slot progress, unused slots stay at 0
    pub counts: [u32; MAX_OBJECTIVES],
    pub completed_at: Option<i64>,
    pub rewarded_at: Option<i64>,
    /// Score copied from the definition when the record was created
    pub score: u32,
}

impl PlayerAchievement {
    pub fn new(achievement_id: u32, score: u32) -> Self {
        Self {
            achievement_id,
            counts: [0; MAX_OBJECTIVES],
            completed_at: None,
            rewarded_at: None,
            score,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_rewarded(&self) -> bool {
        self.rewarded_at.is_some()
    }
}

/// Ordered achievement records of one player
#[derive(Debug, Clone, Default)]
pub struct PlayerProgress {
    records: Vec<PlayerAchievement>,
    incomplete: usize,
    total_score: u32,
    level: u16,
    /// Persist before the next checkpoint
    dirty: bool,
}

impl PlayerProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build progress from stored records.
    ///
    /// Records are partitioned; a repeated achievement id keeps its first
    /// occurrence. Score and level stay at zero until recomputed.
    pub fn from_records(records: impl IntoIterator<Item = PlayerAchievement>) -> Self {
        let mut incomplete: Vec<PlayerAchievement> = Vec::new();
        let mut completed: Vec<PlayerAchievement> = Vec::new();

        for record in records {
            let id = record.achievement_id;
            if incomplete
                .iter()
                .chain(completed.iter())
                .any(|r| r.achievement_id == id)
            {
                tracing::warn!("Ignoring duplicate record for achievement {}", id);
                continue;
            }
            if record.is_completed() {
                completed.push(record);
            } else {
                incomplete.push(record);
            }
        }

        let boundary = incomplete.len();
        incomplete.extend(completed);

        Self {
            records: incomplete,
            incomplete: boundary,
            total_score: 0,
            level: 0,
            dirty: false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn incomplete_count(&self) -> usize {
        self.incomplete
    }

    pub fn completed_count(&self) -> usize {
        self.records.len() - self.incomplete
    }

    /// All records, incomplete ones first
    pub fn records(&self) -> &[PlayerAchievement] {
        &self.records
    }

    pub fn incomplete(&self) -> &[PlayerAchievement] {
        &self.records[..self.incomplete]
    }

    pub fn completed(&self) -> &[PlayerAchievement] {
        &self.records[self.incomplete..]
    }

    pub fn get(&self, achievement_id: u32) -> Option<&PlayerAchievement> {
        self.records
            .iter()
            .find(|record| record.achievement_id == achievement_id)
    }

    /// Whether the achievement is tracked and completed
    pub fn is_completed(&self, achievement_id: u32) -> bool {
        self.completed()
            .iter()
            .any(|record| record.achievement_id == achievement_id)
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn level(&self) -> u16 {
        self.level
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Sum of scores over the completed segment
    pub fn completed_score(&self) -> u32 {
        self.completed()
            .iter()
            .fold(0u32, |total, record| total.saturating_add(record.score))
    }

    pub(crate) fn set_totals(&mut self, total_score: u32, level: u16) {
        self.total_score = total_score;
        self.level = level;
    }

    /// Insert a fresh record as the last incomplete entry.
    ///
    /// Returns `false` if the id is already tracked.
    pub(crate) fn insert(&mut self, achievement_id: u32, score: u32) -> bool {
        if self.get(achievement_id).is_some() {
            return false;
        }
        self.records
            .insert(self.incomplete, PlayerAchievement::new(achievement_id, score));
        self.incomplete += 1;
        self.dirty = true;
        self.debug_check_partition();
        true
    }

    /// Remove a record from whichever segment holds it
    pub(crate) fn remove(&mut self, achievement_id: u32) -> Option<PlayerAchievement> {
        let index = self
            .records
            .iter()
            .position(|record| record.achievement_id == achievement_id)?;
        let record = self.records.remove(index);
        if index < self.incomplete {
            self.incomplete -= 1;
        }
        self.dirty = true;
        self.debug_check_partition();
        Some(record)
    }

    /// Overwrite the counters of an incomplete record
    pub(crate) fn set_counts(&mut self, achievement_id: u32, counts: [u32; MAX_OBJECTIVES]) -> bool {
        match self.incomplete_mut(achievement_id) {
            Some(record) => {
                record.counts = counts;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Move an incomplete record into the completed segment.
    ///
    /// Every objective slot of the definition is filled to its required
    /// count. Returns `false` if the record is not in the incomplete segment.
    pub(crate) fn complete(&mut self, definition: &AchievementDefinition, at: i64) -> bool {
        let Some(index) = self.incomplete_index(definition.id) else {
            return false;
        };

        let record = &mut self.records[index];
        for (slot, objective) in &definition.objectives {
            record.counts[usize::from(*slot)] = objective.count;
        }
        record.completed_at = Some(at);

        self.incomplete -= 1;
        self.records.swap(index, self.incomplete);
        self.dirty = true;
        self.debug_check_partition();
        true
    }

    /// Record the reward claim time of a completed record
    pub(crate) fn set_rewarded(&mut self, achievement_id: u32, at: i64) -> bool {
        let boundary = self.incomplete;
        match self.records[boundary..]
            .iter_mut()
            .find(|record| record.achievement_id == achievement_id)
        {
            Some(record) => {
                record.rewarded_at = Some(at);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Drop every record (session teardown)
    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.incomplete = 0;
        self.total_score = 0;
        self.level = 0;
    }

    fn incomplete_index(&self, achievement_id: u32) -> Option<usize> {
        self.records[..self.incomplete]
            .iter()
            .position(|record| record.achievement_id == achievement_id)
    }

    fn incomplete_mut(&mut self, achievement_id: u32) -> Option<&mut PlayerAchievement> {
        let index = self.incomplete_index(achievement_id)?;
        self.records.get_mut(index)
    }

    fn debug_check_partition(&self) {
        debug_assert!(
            self.records[..self.incomplete]
                .iter()
                .all(|record| !record.is_completed()),
            "completed record before the partition boundary"
        );
        debug_assert!(
            self.records[self.incomplete..]
                .iter()
                .all(PlayerAchievement::is_completed),
            "incomplete record after the partition boundary"
        );
    }
}
