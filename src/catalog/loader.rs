//! Catalog file loader
//!
//! Reads achievement and level definitions from YAML documents:
//! ```yaml
//! body:
//!   - id: 120001
//!     group: battle
//!     name: Poring Hunter
//!     targets:
//!       - slot: 0
//!         count: 3
//!         monster: 1002
//!     dependents: [120000]
//!     score: 10
//!     reward:
//!       item: 501
//!       amount: 2
//!       title: 1000
//! ```
//!
//! Level files use `body: [{ level: 1, points: 100 }, ...]` with one-based
//! levels; they are stored zero-based in memory.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::definitions::{
    AchievementDefinition, AchievementGroup, ItemReward, LevelThreshold, MAX_OBJECTIVES,
    Objective, Reward,
};

/// Error type for catalog loading
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid catalog entry: {0}")]
    Validation(String),
}

#[derive(Debug, Deserialize)]
struct Document<T> {
    #[serde(default = "Vec::new")]
    body: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RawDefinition {
    id: u32,
    group: String,
    name: String,
    #[serde(default)]
    targets: Vec<RawTarget>,
    condition: Option<String>,
    #[serde(default)]
    dependents: Vec<u32>,
    map: Option<String>,
    #[serde(default)]
    score: u32,
    reward: Option<RawReward>,
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    slot: u16,
    count: Option<u32>,
    monster: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawReward {
    item: Option<u32>,
    amount: Option<u16>,
    script: Option<String>,
    title: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawLevel {
    level: u16,
    points: u32,
}

/// Load achievement definitions from a YAML file
pub fn load_definitions(path: &Path) -> Result<Vec<AchievementDefinition>, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    parse_definitions(&content)
}

/// Load level thresholds from a YAML file
pub fn load_level_thresholds(path: &Path) -> Result<Vec<LevelThreshold>, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    parse_level_thresholds(&content)
}

/// Parse achievement definitions from YAML content.
///
/// A later entry with an id seen before replaces the earlier one.
pub fn parse_definitions(content: &str) -> Result<Vec<AchievementDefinition>, CatalogError> {
    let document: Document<RawDefinition> = serde_yaml::from_str(content)?;
    let mut definitions = BTreeMap::new();

    for raw in document.body {
        let definition = convert_definition(raw)?;
        if let Some(previous) = definitions.insert(definition.id, definition) {
            tracing::debug!("Achievement {} redefined, keeping the later entry", previous.id);
        }
    }

    Ok(definitions.into_values().collect())
}

/// Parse level thresholds from YAML content
pub fn parse_level_thresholds(content: &str) -> Result<Vec<LevelThreshold>, CatalogError> {
    let document: Document<RawLevel> = serde_yaml::from_str(content)?;
    let mut levels: BTreeMap<u16, u32> = BTreeMap::new();

    for raw in document.body {
        if raw.level == 0 {
            return Err(CatalogError::Validation(
                "achievement level 0 is invalid (levels start at 1)".to_string(),
            ));
        }
        levels.insert(raw.level - 1, raw.points);
    }

    let mut previous: Option<u32> = None;
    for (level, points) in &levels {
        if previous.is_some_and(|prev| *points < prev) {
            return Err(CatalogError::Validation(format!(
                "level {} requires fewer points ({}) than the level before it",
                level + 1,
                points
            )));
        }
        previous = Some(*points);
    }

    Ok(levels
        .into_iter()
        .map(|(level, points)| LevelThreshold { level, points })
        .collect())
}

fn convert_definition(raw: RawDefinition) -> Result<AchievementDefinition, CatalogError> {
    let id = raw.id;
    let group = AchievementGroup::from_str(&raw.group).ok_or_else(|| {
        CatalogError::Validation(format!("invalid group '{}' for achievement {}", raw.group, id))
    })?;

    if raw.name.trim().is_empty() {
        return Err(CatalogError::Validation(format!(
            "achievement {} has an empty name",
            id
        )));
    }

    if raw.targets.len() > MAX_OBJECTIVES {
        return Err(CatalogError::Validation(format!(
            "achievement {} lists {} targets, the maximum is {}",
            id,
            raw.targets.len(),
            MAX_OBJECTIVES
        )));
    }

    let mut objectives = BTreeMap::new();
    for target in raw.targets {
        if usize::from(target.slot) >= MAX_OBJECTIVES {
            return Err(CatalogError::Validation(format!(
                "achievement {} target slot {} is out of range [0,{})",
                id, target.slot, MAX_OBJECTIVES
            )));
        }
        if target.count.is_none() && target.monster.is_none() {
            return Err(CatalogError::Validation(format!(
                "achievement {} target slot {} has no data",
                id, target.slot
            )));
        }
        if target.monster.is_some() && !group.supports_monsters() {
            return Err(CatalogError::Validation(format!(
                "achievement {}: monster targets are only supported for battle and taming groups",
                id
            )));
        }
        // Slot index checked above
        objectives.insert(
            target.slot as u8,
            Objective {
                count: target.count.unwrap_or(0),
                monster: target.monster,
            },
        );
    }

    if raw.map.is_some() && group != AchievementGroup::Chat {
        return Err(CatalogError::Validation(format!(
            "achievement {}: a map restriction can only be used with the chat group",
            id
        )));
    }

    let reward = match raw.reward {
        Some(reward) => Reward {
            item: reward.item.map(|item_id| ItemReward {
                item_id,
                amount: reward.amount.unwrap_or(1),
            }),
            script: reward.script.filter(|script| !script.trim().is_empty()),
            title_id: reward.title.filter(|title| *title != 0),
        },
        None => Reward::default(),
    };

    let mut dependents = Vec::with_capacity(raw.dependents.len());
    for dependent in raw.dependents {
        if !dependents.contains(&dependent) {
            dependents.push(dependent);
        }
    }

    Ok(AchievementDefinition {
        id,
        group,
        name: raw.name,
        objectives,
        condition: raw.condition.filter(|condition| !condition.trim().is_empty()),
        dependents,
        map: raw.map,
        score: raw.score,
        reward,
    })
}
