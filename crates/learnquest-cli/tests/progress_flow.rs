//! End-to-end progress flow over the file backend with a fixed clock.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use learnquest_core::catalog::{AchievementCatalog, Curriculum};
use learnquest_core::model::Answer;
use learnquest_core::rewards::{RewardConfig, StreakTransition};
use learnquest_core::traits::{FixedClock, NoopNotifier};
use learnquest_core::Tracker;
use learnquest_storage::config::{BackendKind, StorageConfig};
use learnquest_storage::open_store;

const CURRICULUM: &str = r#"[
  {"id": 1, "title": "Basics", "tier": 1, "concept": "basics",
   "quiz": [{"q": "a?", "options": ["x", "y"], "answer": 0},
            {"q": "b?", "options": ["x", "y", "z"], "answer": [1, 2], "multi": true}]},
  {"id": 2, "title": "Loops", "tier": 1, "concept": "loops",
   "quiz": [{"q": "c?", "options": ["x", "y"], "answer": 1}]},
  {"id": 3, "title": "Types", "tier": 2, "xp": 250,
   "quiz": [{"q": "d?", "options": ["x", "y"], "answer": 0}]}
]"#;

const ACHIEVEMENTS: &str = r#"[
  {"id": "first", "type": "levelComplete", "value": 1, "points": 10},
  {"id": "tier1", "type": "tierComplete", "value": 1, "points": 50},
  {"id": "ace", "type": "quizScore", "value": 100, "points": 25},
  {"id": "future", "type": "speedrun", "value": 1, "points": 999}
]"#;

fn content() -> (Curriculum, AchievementCatalog) {
    (
        Curriculum::from_json_str(CURRICULUM, Path::new("levels.json")).unwrap(),
        AchievementCatalog::from_json_str(ACHIEVEMENTS, Path::new("achievements.json")).unwrap(),
    )
}

fn tracker(config: &StorageConfig, clock: Arc<FixedClock>) -> Tracker {
    Tracker::new(
        open_store(config),
        clock,
        Arc::new(NoopNotifier),
        RewardConfig::default(),
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn multi_day_course_survives_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        backend: BackendKind::File,
        path: dir.path().join("progress.json"),
        key: "flow".into(),
    };
    let (curriculum, catalog) = content();
    let clock = Arc::new(FixedClock::on_date(date(2024, 3, 1)));

    // Day 1: one wrong answer, then complete level 1.
    {
        let t = tracker(&config, clock.clone());
        let outcome = t
            .submit_quiz(
                "ada",
                1,
                &[Answer::Single(0), Answer::Single(1)],
                &curriculum,
                &catalog,
            )
            .unwrap();
        assert_eq!(outcome.graded.correct, 1);
        assert_eq!(outcome.quiz_xp, 0);
        assert!(outcome.new_achievements.is_empty());

        let done = t.complete_level("ada", 1, &curriculum, &catalog).unwrap();
        assert_eq!(done.streak.transition, StreakTransition::Started);
        assert_eq!(done.level_xp, 20);
        assert_eq!(done.total_xp, 20 + 10);
    }

    // Day 2, fresh process: practice the miss and finish the tier.
    clock.advance_days(1);
    {
        let t = tracker(&config, clock.clone());
        let pending = t.select_practice_set("ada", 5);
        assert_eq!(pending.len(), 1);
        assert_eq!((pending[0].level_id, pending[0].question_index), (1, 1));
        assert!(t.mark_practiced("ada", 1, 1, true).unwrap());
        assert!(t.select_practice_set("ada", 5).is_empty());

        let outcome = t
            .submit_quiz("ada", 2, &[Answer::Single(1)], &curriculum, &catalog)
            .unwrap();
        let ids: Vec<&str> = outcome.new_achievements.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["ace"]);

        let done = t.complete_level("ada", 2, &curriculum, &catalog).unwrap();
        assert_eq!(done.streak.transition, StreakTransition::Continued);
        assert_eq!(done.streak.streak.current_streak, 2);
        let ids: Vec<&str> = done.new_achievements.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["tier1"]);
    }

    // Day 5: the streak breaks but the best run is kept.
    clock.advance_days(3);
    {
        let t = tracker(&config, clock.clone());
        let done = t.complete_level("ada", 3, &curriculum, &catalog).unwrap();
        assert_eq!(done.level_xp, 250);
        assert_eq!(done.streak.transition, StreakTransition::Broken);
        assert_eq!(done.streak.streak.current_streak, 1);
        assert_eq!(done.streak.streak.max_streak, 2);

        let profile = t.profile("ada");
        assert_eq!(profile.completed_levels.len(), 3);
        assert_eq!(profile.unlocked_achievements.len(), 3);
        assert!(!profile.unlocked_achievements.contains("future"));
        assert_eq!(profile.attempt_log.len(), 3);
        // 20 + 10 | 10 + 25 + 20 + 50 | 250
        assert_eq!(profile.xp, 385);

        let summary = t.summary("ada", &curriculum);
        assert_eq!(summary.completion_percent, 100);
        assert_eq!(summary.accuracy_percent, Some(67));
        assert_eq!(summary.last_completion_date, Some(date(2024, 3, 5)));
    }
}

#[test]
fn separate_storage_keys_do_not_share_profiles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("progress.json");
    let (curriculum, catalog) = content();
    let clock = Arc::new(FixedClock::on_date(date(2024, 3, 1)));

    let course_a = StorageConfig {
        backend: BackendKind::File,
        path: path.clone(),
        key: "course-a".into(),
    };
    let course_b = StorageConfig {
        key: "course-b".into(),
        ..course_a.clone()
    };

    tracker(&course_a, clock.clone())
        .complete_level("ada", 1, &curriculum, &catalog)
        .unwrap();

    assert_eq!(tracker(&course_a, clock.clone()).profile("ada").xp, 30);
    assert_eq!(tracker(&course_b, clock.clone()).profile("ada").xp, 0);
    assert!(tracker(&course_b, clock).leaderboard(10).is_empty());
}
