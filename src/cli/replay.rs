//! Replay command implementation
//!
//! Applies a YAML list of achievement events to a stored player:
//! ```yaml
//! - update: { group: battle, args: [1002] }
//! - add: 120000
//! - complete: 120000
//! - claim: 120000
//! - remove: 120000
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::sync::mpsc;

use achievement_ledger::engine::{
    ChannelAuthority, ClaimOutcome, ClientNotifier, EventArgs, ScriptRuntime,
};
use achievement_ledger::{
    AchievementEngine, AchievementGroup, CatalogHandle, Player, PlayerAchievement, ProgressDb,
};

use super::Loaded;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ReplayEvent {
    Update {
        group: AchievementGroup,
        #[serde(default)]
        args: Vec<i64>,
    },
    Add(u32),
    Remove(u32),
    Complete(u32),
    Claim(u32),
}

/// Notifier that logs what the client would receive
struct LogNotifier;

impl ClientNotifier for LogNotifier {
    fn achievement_update(&self, char_id: u32, record: &PlayerAchievement, completed_count: usize) {
        tracing::info!(
            "[{}] achievement {} counts={:?} completed={} ({} done)",
            char_id,
            record.achievement_id,
            record.counts,
            record.is_completed(),
            completed_count
        );
    }

    fn achievement_list(&self, player: &Player) {
        tracing::info!(
            "[{}] achievement list: {} records, titles {:?}",
            player.char_id,
            player.progress.len(),
            player.titles
        );
    }

    fn reward_ack(&self, char_id: u32, success: bool, achievement_id: u32) {
        tracing::info!(
            "[{}] reward for achievement {}: {}",
            char_id,
            achievement_id,
            if success { "granted" } else { "denied" }
        );
    }
}

/// Offline runtime: every guard passes, scripts are only logged
struct ReplayRuntime;

impl ScriptRuntime for ReplayRuntime {
    fn evaluate_guard(&self, condition: &str, player: &Player, args: &EventArgs<'_>) -> i64 {
        tracing::debug!(
            "[{}] guard '{}' with {:?} treated as satisfied",
            player.char_id,
            condition,
            args.as_slice()
        );
        1
    }

    fn run_script(&self, script: &str, player: &Player) {
        tracing::info!("[{}] reward script: {}", player.char_id, script);
    }
}

/// Apply events from a file to a stored player
pub async fn replay_command(
    config_path: Option<&Path>,
    events_path: &Path,
    char_id: u32,
    dry_run: bool,
) -> Result<()> {
    let loaded = Loaded::load(config_path)?;
    let catalog = CatalogHandle::new(loaded.catalog()?);

    let content = std::fs::read_to_string(events_path)
        .with_context(|| format!("Failed to read events file: {}", events_path.display()))?;
    let events: Vec<ReplayEvent> = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse events file: {}", events_path.display()))?;

    let db_path = loaded.config.database_path(&loaded.base);
    let db = ProgressDb::open(&db_path)?;

    let (authority, mut requests) = ChannelAuthority::channel();
    let (replies, mut answers) = mpsc::unbounded_channel::<(u32, i64)>();

    // Stand-in for the remote authority: approves every claim
    let approver = tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            if let Some(item) = request.item {
                tracing::info!(
                    "[{}] delivering {}x item {}",
                    request.char_id,
                    item.amount,
                    item.item_id
                );
            }
            let approved_at = chrono::Utc::now().timestamp();
            if replies.send((request.achievement_id, approved_at)).is_err() {
                break;
            }
        }
    });

    let engine = AchievementEngine::new(
        catalog,
        Arc::new(LogNotifier),
        Arc::new(ReplayRuntime),
        Arc::new(authority),
    )
    .with_enabled(loaded.config.settings.enabled);

    let mut player = db.load_player(char_id)?;
    engine.refresh_player(&mut player);

    for event in events {
        match event {
            ReplayEvent::Update { group, args } => {
                engine.update_objective(&mut player, group, &args);
            }
            ReplayEvent::Add(id) => {
                if let Err(e) = engine.add_achievement(&mut player, id) {
                    eprintln!("add {}: {}", id, e);
                }
            }
            ReplayEvent::Remove(id) => {
                if let Err(e) = engine.remove_achievement(&mut player, id) {
                    eprintln!("remove {}: {}", id, e);
                }
            }
            ReplayEvent::Complete(id) => {
                if let Err(e) = engine.complete_achievement(&mut player, id) {
                    eprintln!("complete {}: {}", id, e);
                }
            }
            ReplayEvent::Claim(id) => match engine.claim_reward(&mut player, id) {
                Ok(ClaimOutcome::Pending) => {
                    if let Some((achievement_id, approved_at)) = answers.recv().await {
                        if let Err(e) = engine.get_reward(&mut player, achievement_id, approved_at) {
                            eprintln!("reward {}: {}", achievement_id, e);
                        }
                    }
                }
                Ok(ClaimOutcome::Granted) => {}
                Err(e) => eprintln!("claim {}: {}", id, e),
            },
        }
    }

    drop(engine);
    approver.await.ok();

    println!("{}", summary(&player));

    if dry_run {
        println!("Dry run, nothing saved.");
    } else if db.save_if_dirty(char_id, &mut player.progress)? {
        println!("Saved to {}", db_path.display());
    } else {
        println!("No changes.");
    }

    Ok(())
}

fn summary(player: &Player) -> String {
    format!(
        "Character {}: {} achievements ({} completed), score {}, level {}, titles {:?}",
        player.char_id,
        player.progress.len(),
        player.progress.completed_count(),
        player.progress.total_score(),
        player.progress.level(),
        player.titles
    )
}
