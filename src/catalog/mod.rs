//! Read-only achievement catalog shared by every player context
//!
//! A [`Catalog`] is an immutable snapshot of all achievement definitions and
//! level thresholds. Readers take an `Arc<Catalog>` from a [`CatalogHandle`]
//! and keep it for the duration of one operation; a reload swaps the whole
//! snapshot at once, so no reader ever observes a half-built catalog.

mod definitions;
mod loader;

pub use definitions::{
    AchievementDefinition, AchievementGroup, ItemReward, LevelThreshold, MAX_OBJECTIVES,
    Objective, ObjectiveRule, Reward,
};
pub use loader::{CatalogError, load_definitions, load_level_thresholds};

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Immutable snapshot of achievement definitions and level thresholds
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    definitions: BTreeMap<u32, AchievementDefinition>,
    /// Dense, indexed by zero-based level
    levels: Vec<LevelThreshold>,
    /// Monster ids named by any battle or taming objective
    monsters: BTreeSet<u32>,
}

impl Catalog {
    /// Build a catalog from already validated records.
    ///
    /// Dependent ids that do not name a definition in this catalog and
    /// objective slots outside `0..MAX_OBJECTIVES` are dropped with a
    /// warning. Fails if the level table has gaps.
    pub fn new(
        definitions: impl IntoIterator<Item = AchievementDefinition>,
        levels: impl IntoIterator<Item = LevelThreshold>,
    ) -> Result<Self, CatalogError> {
        let mut definitions: BTreeMap<u32, AchievementDefinition> = definitions
            .into_iter()
            .map(|definition| (definition.id, definition))
            .collect();

        let known: Vec<u32> = definitions.keys().copied().collect();
        let mut monsters = BTreeSet::new();
        for definition in definitions.values_mut() {
            let id = definition.id;
            definition.objectives.retain(|slot, _| {
                let valid = usize::from(*slot) < MAX_OBJECTIVES;
                if !valid {
                    tracing::warn!("Dropping objective slot {} from achievement {}", slot, id);
                }
                valid
            });

            if definition.group.supports_monsters() {
                monsters.extend(
                    definition
                        .objectives
                        .values()
                        .filter_map(|objective| objective.monster),
                );
            }

            definition.dependents.retain(|dependent| {
                let exists = known.binary_search(dependent).is_ok();
                if !exists {
                    tracing::warn!(
                        "Dropping unknown dependent {} from achievement {}",
                        dependent,
                        definition.id
                    );
                }
                exists
            });
        }

        let mut levels: Vec<LevelThreshold> = levels.into_iter().collect();
        levels.sort_by_key(|level| level.level);
        for (index, level) in levels.iter().enumerate() {
            if usize::from(level.level) != index {
                return Err(CatalogError::Validation(format!(
                    "level table is not dense: expected level {} but found {}",
                    index + 1,
                    level.level + 1
                )));
            }
        }

        Ok(Self {
            definitions,
            levels,
            monsters,
        })
    }

    /// Load both catalog files from disk
    pub fn load(definitions: &Path, levels: &Path) -> Result<Self, CatalogError> {
        Self::new(load_definitions(definitions)?, load_level_thresholds(levels)?)
    }

    pub fn get(&self, id: u32) -> Option<&AchievementDefinition> {
        self.definitions.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.definitions.contains_key(&id)
    }

    /// All definitions ordered by id
    pub fn iter(&self) -> impl Iterator<Item = &AchievementDefinition> {
        self.definitions.values()
    }

    /// Definitions of a single group ordered by id
    pub fn by_group(&self, group: AchievementGroup) -> impl Iterator<Item = &AchievementDefinition> {
        self.iter().filter(move |definition| definition.group == group)
    }

    /// Level thresholds indexed by zero-based level
    /// Whether any battle or taming objective targets this monster
    pub fn references_monster(&self, monster_id: u32) -> bool {
        self.monsters.contains(&monster_id)
    }

    pub fn levels(&self) -> &[LevelThreshold] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Shared handle to the current catalog snapshot
#[derive(Debug, Clone, Default)]
pub struct CatalogHandle {
    current: Arc<RwLock<Arc<Catalog>>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// Take the current snapshot
    pub fn snapshot(&self) -> Arc<Catalog> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Swap in a new snapshot, returning the previous one
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(id: u32, dependents: Vec<u32>) -> AchievementDefinition {
        let mut def = AchievementDefinition::new(id, AchievementGroup::Adventure, "test");
        def.dependents = dependents;
        def
    }

    #[test]
    fn test_unknown_dependents_are_dropped() {
        let catalog = Catalog::new(
            vec![definition(1, vec![]), definition(2, vec![1, 99])],
            Vec::new(),
        )
        .unwrap();

        assert_eq!(catalog.get(2).unwrap().dependents, vec![1]);
    }

    #[test]
    fn test_out_of_range_slots_are_dropped() {
        let mut hunt = AchievementDefinition::new(5, AchievementGroup::Battle, "Hunt");
        for (slot, monster) in [(0u8, 1002), (MAX_OBJECTIVES as u8, 1003)] {
            hunt.objectives.insert(
                slot,
                Objective {
                    count: 1,
                    monster: Some(monster),
                },
            );
        }

        let catalog = Catalog::new(vec![hunt], Vec::new()).unwrap();

        let objectives = &catalog.get(5).unwrap().objectives;
        assert_eq!(objectives.keys().copied().collect::<Vec<_>>(), vec![0]);
        assert!(catalog.references_monster(1002));
        assert!(!catalog.references_monster(1003));
    }

    #[test]
    fn test_monster_index_ignores_other_groups() {
        let mut hunt = AchievementDefinition::new(6, AchievementGroup::Taming, "Tame");
        hunt.objectives.insert(
            0,
            Objective {
                count: 1,
                monster: Some(1063),
            },
        );
        let mut spend = AchievementDefinition::new(7, AchievementGroup::SpendZeny, "Spend");
        spend.objectives.insert(
            0,
            Objective {
                count: 1,
                monster: Some(1064),
            },
        );

        let catalog = Catalog::new(vec![hunt, spend], Vec::new()).unwrap();

        assert!(catalog.references_monster(1063));
        assert!(!catalog.references_monster(1064));
        assert!(!Catalog::default().references_monster(1063));
    }

    #[test]
    fn test_level_table_must_be_dense() {
        let result = Catalog::new(
            Vec::new(),
            vec![
                LevelThreshold {
                    level: 0,
                    points: 10,
                },
                LevelThreshold {
                    level: 2,
                    points: 30,
                },
            ],
        );
        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[test]
    fn test_levels_are_sorted() {
        let catalog = Catalog::new(
            Vec::new(),
            vec![
                LevelThreshold {
                    level: 1,
                    points: 300,
                },
                LevelThreshold {
                    level: 0,
                    points: 100,
                },
            ],
        )
        .unwrap();
        assert_eq!(catalog.levels()[0].points, 100);
        assert_eq!(catalog.levels()[1].points, 300);
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let handle = CatalogHandle::new(Catalog::new(vec![definition(1, vec![])], Vec::new()).unwrap());
        let before = handle.snapshot();

        handle.replace(Catalog::default());

        assert!(before.contains(1));
        assert!(handle.snapshot().is_empty());
    }
}
