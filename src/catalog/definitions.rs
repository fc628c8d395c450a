//! Achievement definitions and level thresholds
//!
//! Everything in here is immutable once a [`super::Catalog`] has been built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of independent objective slots an achievement can carry
pub const MAX_OBJECTIVES: usize = 10;

/// Event category that can affect an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementGroup {
    AddFriend,
    Adventure,
    Baby,
    Battle,
    Chat,
    ChatCount,
    ChatCreate,
    ChatDying,
    Eat,
    GetItem,
    GetZeny,
    GoalAchieve,
    GoalLevel,
    GoalStatus,
    Hear,
    JobChange,
    Marry,
    Party,
    RefineFail,
    RefineSuccess,
    See,
    SpendZeny,
    Taming,
}

/// How events of a group change objective progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveRule {
    /// Completes as soon as the guard condition evaluates to nonzero
    Condition,
    /// Adds event values to every unfinished slot, gated by the guard condition
    GuardedAccumulator,
    /// Counts slots whose monster matches the first event argument
    MonsterKeyed,
    /// Never changed by events (only reachable through dependents or admin actions)
    Passive,
    /// Events of this group are ignored entirely
    Unsupported,
}

impl AchievementGroup {
    /// All groups in declaration order
    pub const ALL: [AchievementGroup; 23] = [
        Self::AddFriend,
        Self::Adventure,
        Self::Baby,
        Self::Battle,
        Self::Chat,
        Self::ChatCount,
        Self::ChatCreate,
        Self::ChatDying,
        Self::Eat,
        Self::GetItem,
        Self::GetZeny,
        Self::GoalAchieve,
        Self::GoalLevel,
        Self::GoalStatus,
        Self::Hear,
        Self::JobChange,
        Self::Marry,
        Self::Party,
        Self::RefineFail,
        Self::RefineSuccess,
        Self::See,
        Self::SpendZeny,
        Self::Taming,
    ];

    /// Get the string ID used in data files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddFriend => "add_friend",
            Self::Adventure => "adventure",
            Self::Baby => "baby",
            Self::Battle => "battle",
            Self::Chat => "chat",
            Self::ChatCount => "chat_count",
            Self::ChatCreate => "chat_create",
            Self::ChatDying => "chat_dying",
            Self::Eat => "eat",
            Self::GetItem => "get_item",
            Self::GetZeny => "get_zeny",
            Self::GoalAchieve => "goal_achieve",
            Self::GoalLevel => "goal_level",
            Self::GoalStatus => "goal_status",
            Self::Hear => "hear",
            Self::JobChange => "job_change",
            Self::Marry => "marry",
            Self::Party => "party",
            Self::RefineFail => "refine_fail",
            Self::RefineSuccess => "refine_success",
            Self::See => "see",
            Self::SpendZeny => "spend_zeny",
            Self::Taming => "taming",
        }
    }

    /// Parse from a data file string
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|group| group.as_str() == s)
    }

    /// Update rule applied to definitions of this group
    pub fn rule(&self) -> ObjectiveRule {
        match self {
            Self::AddFriend
            | Self::Baby
            | Self::ChatCount
            | Self::ChatCreate
            | Self::ChatDying
            | Self::GetItem
            | Self::GetZeny
            | Self::GoalAchieve
            | Self::GoalLevel
            | Self::GoalStatus
            | Self::JobChange
            | Self::Marry
            | Self::Party
            | Self::RefineFail
            | Self::RefineSuccess => ObjectiveRule::Condition,
            Self::SpendZeny => ObjectiveRule::GuardedAccumulator,
            Self::Battle | Self::Taming => ObjectiveRule::MonsterKeyed,
            // No trigger events are defined for chat rooms yet
            Self::Chat => ObjectiveRule::Unsupported,
            Self::Adventure | Self::Eat | Self::Hear | Self::See => ObjectiveRule::Passive,
        }
    }

    /// Whether objectives of this group may filter on a monster id
    pub fn supports_monsters(&self) -> bool {
        matches!(self, Self::Battle | Self::Taming)
    }

    /// Whether definitions of this group take part in the dependent-only unlock scan
    pub fn unlocks_by_dependents(&self) -> bool {
        matches!(self, Self::Battle | Self::Taming | Self::Adventure)
    }
}

/// One objective slot of an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    /// Required count for this slot
    pub count: u32,
    /// Monster filter (battle and taming groups only)
    pub monster: Option<u32>,
}

/// Item handed out by the reward authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReward {
    pub item_id: u32,
    pub amount: u16,
}

/// Reward bundle granted once per player on claim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub item: Option<ItemReward>,
    /// One-shot script executed with the claiming player attached
    pub script: Option<String>,
    pub title_id: Option<u32>,
}

impl Reward {
    pub fn is_empty(&self) -> bool {
        self.item.is_none() && self.script.is_none() && self.title_id.is_none()
    }
}

/// Achievement definition with all metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub id: u32,
    pub group: AchievementGroup,
    pub name: String,
    /// Objective slots keyed by slot index (always `< MAX_OBJECTIVES`)
    pub objectives: BTreeMap<u8, Objective>,
    /// Guard expression, evaluated by the script runtime
    pub condition: Option<String>,
    /// Achievements that must be completed first
    pub dependents: Vec<u32>,
    /// Map restriction (chat group only)
    pub map: Option<String>,
    pub score: u32,
    pub reward: Reward,
}

impl AchievementDefinition {
    /// Create a bare definition without objectives, guard or reward
    pub fn new(id: u32, group: AchievementGroup, name: impl Into<String>) -> Self {
        Self {
            id,
            group,
            name: name.into(),
            objectives: BTreeMap::new(),
            condition: None,
            dependents: Vec::new(),
            map: None,
            score: 0,
            reward: Reward::default(),
        }
    }

    /// Check whether the given counts satisfy every objective slot
    pub fn objectives_met(&self, counts: &[u32; MAX_OBJECTIVES]) -> bool {
        self.objectives
            .iter()
            .all(|(slot, objective)| counts[usize::from(*slot)] >= objective.count)
    }
}

/// Cumulative score needed to reach a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelThreshold {
    /// Zero-based level index
    pub level: u16,
    pub points: u32,
}
