//! Collaborator seams: client notifications, scripting, reward approval

use tokio::sync::mpsc;

use crate::catalog::{AchievementDefinition, ItemReward};
use crate::progress::{Player, PlayerAchievement};

/// Sink for messages sent to the player's client
pub trait ClientNotifier: Send + Sync {
    /// A record was added, changed or removed (removal sends a zeroed record)
    fn achievement_update(&self, char_id: u32, record: &PlayerAchievement, completed_count: usize);

    /// Full achievement and title list
    fn achievement_list(&self, player: &Player);

    /// Outcome of a reward claim
    fn reward_ack(&self, char_id: u32, success: bool, achievement_id: u32);
}

/// Event arguments visible to a guard condition.
///
/// Lives exactly as long as one guard evaluation; runtimes that need named
/// variables bind [`EventArgs::bindings`] for the duration of the call.
#[derive(Debug, Clone, Copy)]
pub struct EventArgs<'a> {
    values: &'a [i64],
}

impl<'a> EventArgs<'a> {
    pub fn new(values: &'a [i64]) -> Self {
        Self { values }
    }

    /// Argument at `index`, 0 when the event did not supply it
    pub fn get(&self, index: usize) -> i64 {
        self.values.get(index).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &'a [i64] {
        self.values
    }

    /// Named bindings `ARG0..ARGn`
    pub fn bindings(&self) -> impl Iterator<Item = (String, i64)> + 'a {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (format!("ARG{}", index), *value))
    }
}

/// Embedded scripting runtime
pub trait ScriptRuntime: Send + Sync {
    /// Evaluate a guard condition for the player; nonzero means satisfied
    fn evaluate_guard(&self, condition: &str, player: &Player, args: &EventArgs<'_>) -> i64;

    /// Run a reward script with the player attached
    fn run_script(&self, script: &str, player: &Player);
}

/// Answer of the reward authority to a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardDecision {
    /// Approved on the spot with the given claim time (0 counts as denial)
    Approved(i64),
    /// Answer arrives later through `AchievementEngine::get_reward`
    Pending,
    Denied,
}

/// Authority that approves reward claims and delivers reward items
pub trait RewardAuthority: Send + Sync {
    fn request_reward_approval(&self, char_id: u32, definition: &AchievementDefinition) -> RewardDecision;
}

/// Authority that approves every claim immediately with the current time
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAuthority;

impl RewardAuthority for LocalAuthority {
    fn request_reward_approval(&self, char_id: u32, definition: &AchievementDefinition) -> RewardDecision {
        if let Some(item) = definition.reward.item {
            tracing::info!(
                "Delivering {}x item {} to character {} for achievement {}",
                item.amount,
                item.item_id,
                char_id,
                definition.id
            );
        }
        RewardDecision::Approved(chrono::Utc::now().timestamp())
    }
}

/// Reward claim forwarded to a remote authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardRequest {
    pub char_id: u32,
    pub achievement_id: u32,
    pub item: Option<ItemReward>,
}

/// Authority that forwards claims over a channel and answers later.
///
/// The receiving side replies by calling `AchievementEngine::get_reward`
/// with the claim time, or 0 to deny.
#[derive(Debug, Clone)]
pub struct ChannelAuthority {
    requests: mpsc::UnboundedSender<RewardRequest>,
}

impl ChannelAuthority {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RewardRequest>) {
        let (requests, receiver) = mpsc::unbounded_channel();
        (Self { requests }, receiver)
    }
}

impl RewardAuthority for ChannelAuthority {
    fn request_reward_approval(&self, char_id: u32, definition: &AchievementDefinition) -> RewardDecision {
        let request = RewardRequest {
            char_id,
            achievement_id: definition.id,
            item: definition.reward.item,
        };
        match self.requests.send(request) {
            Ok(()) => RewardDecision::Pending,
            Err(_) => {
                tracing::warn!(
                    "Reward authority unavailable, denying claim of achievement {} for character {}",
                    definition.id,
                    char_id
                );
                RewardDecision::Denied
            }
        }
    }
}
