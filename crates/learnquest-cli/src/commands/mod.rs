pub mod init;
pub mod practice;
pub mod profile;
pub mod progress;
pub mod report;
pub mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use learnquest_core::catalog::{Achievement, AchievementCatalog, Curriculum};
use learnquest_core::model::StreakState;
use learnquest_core::traits::{RewardNotifier, SystemClock};
use learnquest_core::Tracker;
use learnquest_storage::config::{load_config_from, LearnquestConfig};
use learnquest_storage::open_store;

/// Console reward notifier.
struct ConsoleNotifier;

impl RewardNotifier for ConsoleNotifier {
    fn on_xp_changed(&self, _identity: &str, delta: i64, total: u32) {
        eprintln!("  {delta:+} XP (total {total})");
    }

    fn on_achievement_unlocked(&self, _identity: &str, achievement: &Achievement) {
        let title = if achievement.title.is_empty() {
            &achievement.id
        } else {
            &achievement.title
        };
        eprintln!("  Achievement unlocked: {title} (+{} XP)", achievement.points);
    }

    fn on_level_completed(&self, _identity: &str, level_id: u32, streak: &StreakState) {
        eprintln!(
            "  Level {level_id} complete, streak {} day(s)",
            streak.current_streak
        );
    }
}

/// A tracker opened from configuration.
pub struct Session {
    pub config: LearnquestConfig,
    pub tracker: Tracker,
}

impl Session {
    pub fn open(config_path: Option<PathBuf>) -> Result<Self> {
        let config = load_config_from(config_path.as_deref())?;
        let tracker = Tracker::new(
            open_store(&config.storage),
            Arc::new(SystemClock),
            Arc::new(ConsoleNotifier),
            config.rewards.clone(),
        );
        Ok(Self { config, tracker })
    }

    pub fn curriculum(&self) -> Result<Curriculum> {
        Curriculum::load(&self.config.content.curriculum)
    }

    pub fn achievements(&self) -> Result<AchievementCatalog> {
        AchievementCatalog::load(&self.config.content.achievements)
    }
}
