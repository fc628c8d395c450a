//! Shared test utilities for achievement engine tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use achievement_ledger::catalog::{Objective, Reward};
use achievement_ledger::engine::{
    ClientNotifier, EventArgs, RewardAuthority, RewardDecision, ScriptRuntime,
};
use achievement_ledger::{
    AchievementDefinition, AchievementEngine, AchievementGroup, Catalog, CatalogHandle,
    LevelThreshold, Player, PlayerAchievement,
};

/// Fixed time returned by the test clock
pub const NOW: i64 = 1_700_000_000;

fn fixed_clock() -> i64 {
    NOW
}

/// Message captured by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Update {
        char_id: u32,
        record: PlayerAchievement,
        completed_count: usize,
    },
    List {
        char_id: u32,
        titles: Vec<u32>,
    },
    RewardAck {
        char_id: u32,
        success: bool,
        achievement_id: u32,
    },
}

/// Notifier that keeps every message for later inspection
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<Notification> {
        self.messages.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }

    /// Record updates sent for one achievement, oldest first
    pub fn updates_for(&self, achievement_id: u32) -> Vec<PlayerAchievement> {
        self.messages()
            .into_iter()
            .filter_map(|message| match message {
                Notification::Update { record, .. } if record.achievement_id == achievement_id => {
                    Some(record)
                }
                _ => None,
            })
            .collect()
    }

    /// Reward acks as `(success, achievement_id)`
    pub fn acks(&self) -> Vec<(bool, u32)> {
        self.messages()
            .into_iter()
            .filter_map(|message| match message {
                Notification::RewardAck {
                    success,
                    achievement_id,
                    ..
                } => Some((success, achievement_id)),
                _ => None,
            })
            .collect()
    }
}

impl ClientNotifier for RecordingNotifier {
    fn achievement_update(&self, char_id: u32, record: &PlayerAchievement, completed_count: usize) {
        self.messages.lock().unwrap().push(Notification::Update {
            char_id,
            record: record.clone(),
            completed_count,
        });
    }

    fn achievement_list(&self, player: &Player) {
        self.messages.lock().unwrap().push(Notification::List {
            char_id: player.char_id,
            titles: player.titles.clone(),
        });
    }

    fn reward_ack(&self, char_id: u32, success: bool, achievement_id: u32) {
        self.messages.lock().unwrap().push(Notification::RewardAck {
            char_id,
            success,
            achievement_id,
        });
    }
}

type Guard = Arc<dyn Fn(&Player, &[i64]) -> i64 + Send + Sync>;

/// Script runtime whose guards are set per condition text.
///
/// Unknown conditions evaluate to 0.
#[derive(Default)]
pub struct ScriptedRuntime {
    guards: Mutex<HashMap<String, Guard>>,
    scripts: Mutex<Vec<String>>,
    seen_args: Mutex<Vec<Vec<i64>>>,
}

impl ScriptedRuntime {
    pub fn set_guard(&self, condition: &str, value: i64) {
        self.set_guard_fn(condition, move |_, _| value);
    }

    pub fn set_guard_fn(
        &self,
        condition: &str,
        guard: impl Fn(&Player, &[i64]) -> i64 + Send + Sync + 'static,
    ) {
        self.guards
            .lock()
            .unwrap()
            .insert(condition.to_string(), Arc::new(guard));
    }

    pub fn scripts_run(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }

    /// Arguments of every guard evaluation, oldest first
    pub fn seen_args(&self) -> Vec<Vec<i64>> {
        self.seen_args.lock().unwrap().clone()
    }
}

impl ScriptRuntime for ScriptedRuntime {
    fn evaluate_guard(&self, condition: &str, player: &Player, args: &EventArgs<'_>) -> i64 {
        self.seen_args.lock().unwrap().push(args.as_slice().to_vec());
        let guard = self.guards.lock().unwrap().get(condition).cloned();
        guard.map_or(0, |guard| guard(player, args.as_slice()))
    }

    fn run_script(&self, script: &str, _player: &Player) {
        self.scripts.lock().unwrap().push(script.to_string());
    }
}

/// Reward authority that answers with a preset decision
pub struct ManualAuthority {
    decision: Mutex<RewardDecision>,
    requests: Mutex<Vec<u32>>,
}

impl Default for ManualAuthority {
    fn default() -> Self {
        Self {
            decision: Mutex::new(RewardDecision::Approved(NOW)),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl ManualAuthority {
    pub fn set_decision(&self, decision: RewardDecision) {
        *self.decision.lock().unwrap() = decision;
    }

    /// Achievement ids the engine asked about
    pub fn requests(&self) -> Vec<u32> {
        self.requests.lock().unwrap().clone()
    }
}

impl RewardAuthority for ManualAuthority {
    fn request_reward_approval(&self, _char_id: u32, definition: &AchievementDefinition) -> RewardDecision {
        self.requests.lock().unwrap().push(definition.id);
        *self.decision.lock().unwrap()
    }
}

/// Engine wired to recording collaborators
pub struct Harness {
    pub engine: AchievementEngine,
    pub notifier: Arc<RecordingNotifier>,
    pub scripts: Arc<ScriptedRuntime>,
    pub authority: Arc<ManualAuthority>,
}

pub fn harness(definitions: Vec<AchievementDefinition>, points: &[u32]) -> Harness {
    let catalog = Catalog::new(definitions, levels(points)).unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let scripts = Arc::new(ScriptedRuntime::default());
    let authority = Arc::new(ManualAuthority::default());

    let engine = AchievementEngine::new(
        CatalogHandle::new(catalog),
        notifier.clone(),
        scripts.clone(),
        authority.clone(),
    )
    .with_clock(fixed_clock);

    Harness {
        engine,
        notifier,
        scripts,
        authority,
    }
}

pub fn levels(points: &[u32]) -> Vec<LevelThreshold> {
    points
        .iter()
        .enumerate()
        .map(|(level, points)| LevelThreshold {
            level: level as u16,
            points: *points,
        })
        .collect()
}

/// Monster-keyed definition; targets are `(slot, monster, count)`
pub fn battle(id: u32, score: u32, targets: &[(u8, u32, u32)]) -> AchievementDefinition {
    let mut definition = AchievementDefinition::new(id, AchievementGroup::Battle, format!("Hunt {}", id));
    definition.score = score;
    for (slot, monster, count) in targets {
        definition.objectives.insert(
            *slot,
            Objective {
                count: *count,
                monster: Some(*monster),
            },
        );
    }
    definition
}

/// Definition completed as soon as its guard passes
pub fn conditional(id: u32, group: AchievementGroup, condition: &str, score: u32) -> AchievementDefinition {
    let mut definition = AchievementDefinition::new(id, group, format!("Goal {}", id));
    definition.condition = Some(condition.to_string());
    definition.score = score;
    definition
}

/// Zeny spending definition; targets are `(slot, count)`
pub fn spending(id: u32, condition: &str, targets: &[(u8, u32)]) -> AchievementDefinition {
    let mut definition = conditional(id, AchievementGroup::SpendZeny, condition, 5);
    for (slot, count) in targets {
        definition.objectives.insert(
            *slot,
            Objective {
                count: *count,
                monster: None,
            },
        );
    }
    definition
}

pub fn with_dependents(mut definition: AchievementDefinition, dependents: &[u32]) -> AchievementDefinition {
    definition.dependents = dependents.to_vec();
    definition
}

pub fn with_reward(mut definition: AchievementDefinition, reward: Reward) -> AchievementDefinition {
    definition.reward = reward;
    definition
}

/// Track and complete an achievement through the admin operations
pub fn force_complete(harness: &Harness, player: &mut Player, achievement_id: u32) {
    harness.engine.add_achievement(player, achievement_id).unwrap();
    harness.engine.complete_achievement(player, achievement_id).unwrap();
}
