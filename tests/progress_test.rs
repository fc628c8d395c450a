//! Progress store and persistence tests

mod common;

use achievement_ledger::engine::compute_level;
use achievement_ledger::{AchievementGroup, Player, PlayerProgress, ProgressDb, ProgressInfo};
use common::{Harness, NOW, battle, conditional, force_complete, harness, levels};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tempfile::tempdir;

fn assert_partition(progress: &PlayerProgress) {
    assert_eq!(
        progress.len(),
        progress.incomplete_count() + progress.completed_count()
    );
    assert!(progress.incomplete().iter().all(|record| !record.is_completed()));
    assert!(progress.completed().iter().all(|record| record.is_completed()));

    let mut ids: Vec<u32> = progress.records().iter().map(|record| record.achievement_id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), progress.len(), "duplicate achievement records");
}

fn eight_goals() -> Harness {
    let definitions = (1..=8)
        .map(|id| conditional(id, AchievementGroup::Marry, &format!("goal {}", id), id * 10))
        .collect();
    harness(definitions, &[50, 150, 300])
}

#[test]
fn test_random_operations_keep_partition_and_score() {
    let h = eight_goals();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut player = Player::new(7);

    for _ in 0..500 {
        let id = rng.gen_range(1..=9u32);
        match rng.gen_range(0..4) {
            0 => {
                let _ = h.engine.add_achievement(&mut player, id);
            }
            1 => {
                let _ = h.engine.complete_achievement(&mut player, id);
            }
            2 => {
                let _ = h.engine.remove_achievement(&mut player, id);
            }
            _ => {
                let _ = h.engine.claim_reward(&mut player, id);
            }
        }

        assert_partition(&player.progress);
        assert!(player.progress.completed().iter().all(|record| record.completed_at == Some(NOW)));
        assert!(
            player
                .progress
                .records()
                .iter()
                .all(|record| !record.is_rewarded() || record.is_completed())
        );

        let expected: u32 = player
            .progress
            .completed()
            .iter()
            .map(|record| record.achievement_id * 10)
            .sum();
        assert_eq!(player.progress.total_score(), expected);
        assert_eq!(
            player.progress.level(),
            compute_level(expected, &levels(&[50, 150, 300])).level
        );
    }
}

#[test]
fn test_add_rejects_duplicates_and_unknown_ids() {
    let h = eight_goals();
    let mut player = Player::new(7);

    let record = h.engine.add_achievement(&mut player, 3).unwrap();
    assert_eq!(record.score, 30);
    assert!(player.progress.is_dirty());

    assert!(h.engine.add_achievement(&mut player, 3).is_err());
    assert!(h.engine.add_achievement(&mut player, 99).is_err());
    assert_eq!(player.progress.len(), 1);
}

#[test]
fn test_remove_sends_zeroed_record() {
    let h = eight_goals();
    let mut player = Player::new(7);
    force_complete(&h, &mut player, 2);

    h.engine.remove_achievement(&mut player, 2).unwrap();

    let last = h.notifier.updates_for(2).pop().unwrap();
    assert_eq!(last.counts, [0; 10]);
    assert!(!last.is_completed());
    assert!(player.progress.get(2).is_none());
    assert!(h.engine.remove_achievement(&mut player, 2).is_err());
}

#[test]
fn test_removing_completed_record_drops_its_score() {
    let h = eight_goals();
    let mut player = Player::new(7);
    force_complete(&h, &mut player, 8);
    force_complete(&h, &mut player, 3);
    assert_eq!(player.progress.total_score(), 110);
    assert_eq!(player.progress.level(), 1);

    h.engine.remove_achievement(&mut player, 8).unwrap();

    assert_eq!(player.progress.total_score(), 30);
    assert_eq!(player.progress.level(), 0);
    assert_eq!(h.engine.check_progress_code(&player, 3, 15), 30);
    assert_eq!(h.engine.check_progress_code(&player, 3, 14), 0);
}

#[test]
fn test_complete_twice_is_rejected() {
    let h = eight_goals();
    let mut player = Player::new(7);
    force_complete(&h, &mut player, 4);

    assert!(h.engine.complete_achievement(&mut player, 4).is_err());
    assert!(h.engine.complete_achievement(&mut player, 5).is_err());
    assert_eq!(player.progress.total_score(), 40);
}

#[test]
fn test_check_progress_values_and_sentinels() {
    let h = harness(vec![battle(1000, 60, &[(0, 1002, 2), (3, 1003, 1)])], &[50, 150]);
    let mut player = Player::new(7);
    h.engine.update_objective(&mut player, AchievementGroup::Battle, &[1002]);

    assert_eq!(h.engine.check_progress(&player, 1000, ProgressInfo::Count(1)), Ok(1));
    assert_eq!(h.engine.check_progress(&player, 1000, ProgressInfo::Complete), Ok(0));
    assert_eq!(h.engine.check_progress_code(&player, 1000, 12), 0);
    assert_eq!(h.engine.check_progress_code(&player, 2000, 1), -1);
    assert_eq!(h.engine.check_progress_code(&player, 1000, 0), -2);
    assert_eq!(h.engine.check_progress_code(&player, 1000, 16), -2);

    h.engine.update_objective(&mut player, AchievementGroup::Battle, &[1003]);
    h.engine.update_objective(&mut player, AchievementGroup::Battle, &[1002]);

    assert_eq!(h.engine.check_progress_code(&player, 1000, 4), 1);
    assert_eq!(h.engine.check_progress_code(&player, 1000, 11), 1);
    assert_eq!(h.engine.check_progress_code(&player, 1000, 12), NOW);
    assert_eq!(h.engine.check_progress_code(&player, 1000, 13), 0);
    assert_eq!(h.engine.check_progress_code(&player, 1000, 14), 1);
    assert_eq!(h.engine.check_progress_code(&player, 1000, 15), 60);
    // Level and score ignore the achievement id
    assert_eq!(h.engine.check_progress_code(&player, 31337, 15), 60);
}

#[test]
fn test_progress_survives_database_round_trip() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("progress.db");
    let h = eight_goals();

    let mut player = Player::new(7);
    force_complete(&h, &mut player, 6);
    force_complete(&h, &mut player, 1);
    h.engine.add_achievement(&mut player, 2).unwrap();
    h.engine.claim_reward(&mut player, 6).unwrap();

    {
        let db = ProgressDb::open(&db_path).unwrap();
        assert!(db.save_if_dirty(7, &mut player.progress).unwrap());
        assert!(!player.progress.is_dirty());
        assert!(!db.save_if_dirty(7, &mut player.progress).unwrap());
    }

    let db = ProgressDb::open(&db_path).unwrap();
    let mut loaded = db.load_player(7).unwrap();
    let level = h.engine.refresh_player(&mut loaded);

    assert_partition(&loaded.progress);
    assert_eq!(loaded.progress.completed_count(), 2);
    assert_eq!(loaded.progress.incomplete_count(), 1);
    assert_eq!(loaded.progress.total_score(), 70);
    assert_eq!(level.level, 1);
    assert_eq!(loaded.progress.get(6).unwrap().rewarded_at, Some(NOW));
    assert_eq!(loaded.progress.get(1).unwrap().completed_at, Some(NOW));
    assert_eq!(loaded.progress.get(2).unwrap().completed_at, None);

    assert!(db.load_player(8).unwrap().progress.is_empty());
}
