//! Objective updates driven by gameplay events

use super::AchievementEngine;
use super::dependents::dependents_completed;
use super::hooks::EventArgs;
use crate::catalog::{AchievementDefinition, AchievementGroup, Catalog, MAX_OBJECTIVES, ObjectiveRule};
use crate::progress::Player;

/// Why an event left a definition untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    DependentsMissing,
    AlreadyCompleted,
    NoGuard,
    GuardFailed,
    NoObjectives,
    NoMatch,
    NotEventDriven,
    NoProgress,
}

impl AchievementEngine {
    /// Apply a gameplay event to every achievement of its group.
    ///
    /// `args` are the event's numeric arguments: the monster id for battle
    /// and taming, per-slot amounts for accumulating groups, and free-form
    /// values for guard conditions.
    pub fn update_objective(&self, player: &mut Player, group: AchievementGroup, args: &[i64]) {
        let catalog = self.catalog.snapshot();
        self.update_objective_with(&catalog, player, group, args);
    }

    pub(crate) fn update_objective_with(
        &self,
        catalog: &Catalog,
        player: &mut Player,
        group: AchievementGroup,
        args: &[i64],
    ) {
        if !self.enabled {
            return;
        }

        if group.rule() == ObjectiveRule::Unsupported {
            tracing::debug!("Ignoring {} event: group has no trigger rules", group.as_str());
            return;
        }

        let args = EventArgs::new(args);
        if group.rule() == ObjectiveRule::MonsterKeyed {
            let referenced = u32::try_from(args.get(0))
                .is_ok_and(|monster| catalog.references_monster(monster));
            if !referenced {
                return;
            }
        }

        for definition in catalog.by_group(group) {
            if let Err(skip) = self.update_objectives(catalog, player, definition, &args) {
                tracing::trace!(
                    "Achievement {} unchanged for character {}: {:?}",
                    definition.id,
                    player.char_id,
                    skip
                );
            }
        }
    }

    /// Run one definition's update rule against an event
    fn update_objectives(
        &self,
        catalog: &Catalog,
        player: &mut Player,
        definition: &AchievementDefinition,
        args: &EventArgs<'_>,
    ) -> Result<(), Skip> {
        let (is_new, mut counts) = match player.progress.get(definition.id) {
            None => {
                if !dependents_completed(&player.progress, definition) {
                    return Err(Skip::DependentsMissing);
                }
                (true, [0u32; MAX_OBJECTIVES])
            }
            Some(record) if record.is_completed() => return Err(Skip::AlreadyCompleted),
            Some(record) => (false, record.counts),
        };

        let complete = match definition.group.rule() {
            ObjectiveRule::Condition => {
                let condition = definition.condition.as_deref().ok_or(Skip::NoGuard)?;
                if !self.guard_passes(condition, player, args) {
                    return Err(Skip::GuardFailed);
                }
                true
            }
            ObjectiveRule::GuardedAccumulator => {
                if definition.objectives.is_empty() {
                    return Err(Skip::NoObjectives);
                }
                let condition = definition.condition.as_deref().ok_or(Skip::NoGuard)?;

                for (slot, objective) in &definition.objectives {
                    let slot = usize::from(*slot);
                    if counts[slot] < objective.count {
                        let amount = u32::try_from(args.get(slot).max(0)).unwrap_or(u32::MAX);
                        counts[slot] = counts[slot].saturating_add(amount);
                    }
                }

                // The scratch counts are simply dropped when the guard fails
                if !self.guard_passes(condition, player, args) {
                    return Err(Skip::GuardFailed);
                }
                definition.objectives_met(&counts)
            }
            ObjectiveRule::MonsterKeyed => {
                if definition.objectives.is_empty() {
                    return Err(Skip::NoObjectives);
                }

                let monster = args.get(0);
                let mut changed = false;
                for (slot, objective) in &definition.objectives {
                    let slot = usize::from(*slot);
                    let matches = objective.monster.is_some_and(|id| i64::from(id) == monster);
                    if matches && counts[slot] < objective.count {
                        counts[slot] += 1;
                        changed = true;
                    }
                }

                if !changed {
                    return Err(Skip::NoMatch);
                }
                definition.objectives_met(&counts)
            }
            ObjectiveRule::Passive | ObjectiveRule::Unsupported => {
                return Err(Skip::NotEventDriven);
            }
        };

        if is_new {
            // Brand-new records are only kept once they show some progress
            if !complete && counts.iter().all(|count| *count == 0) {
                return Err(Skip::NoProgress);
            }
            if let Err(e) = self.add_with(catalog, player, definition.id) {
                tracing::debug!("Could not track achievement {}: {}", definition.id, e);
                return Err(Skip::NoProgress);
            }
        }

        player.progress.set_counts(definition.id, counts);
        if let Err(e) = self.update_achievement_with(catalog, player, definition.id, complete) {
            tracing::debug!("Could not update achievement {}: {}", definition.id, e);
        }
        Ok(())
    }

    fn guard_passes(&self, condition: &str, player: &Player, args: &EventArgs<'_>) -> bool {
        self.scripts.evaluate_guard(condition, player, args) != 0
    }
}
