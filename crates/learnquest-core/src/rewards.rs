//! XP bookkeeping, the day-streak state machine and achievement evaluation.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{Achievement, AchievementCatalog, AchievementKind, Curriculum, Level};
use crate::model::{LearnerProfile, StreakState};

/// Reward amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Level completion XP per tier, for levels that do not set their own reward.
    pub xp_per_tier: u32,
    /// Lowest quiz score (percent) that earns quiz XP.
    pub quiz_xp_min_score: u32,
    /// Quiz XP is the score percent divided by this.
    pub quiz_xp_divisor: u32,
    /// Lowest quiz score (percent) that completes the level from the quiz.
    pub good_score_threshold: u32,
    /// XP for completing a level with a good quiz score.
    pub good_score_xp: u32,
    /// XP deducted when the learner takes a hint.
    pub hint_penalty: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            xp_per_tier: 20,
            quiz_xp_min_score: 80,
            quiz_xp_divisor: 10,
            good_score_threshold: 70,
            good_score_xp: 5,
            hint_penalty: 5,
        }
    }
}

impl RewardConfig {
    /// XP for completing `level`: its own reward, else tier times `xp_per_tier`.
    pub fn level_xp(&self, level: &Level) -> u32 {
        level
            .xp
            .unwrap_or_else(|| level.tier.saturating_mul(self.xp_per_tier))
    }

    /// XP for a quiz scored at `score_percent`.
    pub fn quiz_xp(&self, score_percent: u32) -> u32 {
        if score_percent < self.quiz_xp_min_score || self.quiz_xp_divisor == 0 {
            return 0;
        }
        score_percent / self.quiz_xp_divisor
    }

    pub fn is_good_score(&self, score_percent: u32) -> bool {
        score_percent >= self.good_score_threshold
    }
}

// ---------------------------------------------------------------------------
// XP
// ---------------------------------------------------------------------------

impl LearnerProfile {
    /// Add XP, saturating at `u32::MAX`. Returns the new total.
    pub fn grant_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        self.xp
    }

    /// Remove XP, flooring at zero. Returns the new total.
    pub fn deduct_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_sub(amount);
        self.xp
    }
}

// ---------------------------------------------------------------------------
// Streaks
// ---------------------------------------------------------------------------

/// How a streak update changed the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreakTransition {
    /// First completion ever.
    Started,
    /// Completion on the day after the previous one.
    Continued,
    /// A day or more was skipped; the streak restarts at 1.
    Broken,
    /// Already credited today; the count is unchanged.
    SameDay,
}

impl StreakState {
    /// Whole calendar days between the last completion and `today`.
    pub fn days_since_last(&self, today: NaiveDate) -> Option<i64> {
        self.last_completion_date
            .map(|last| (today - last).num_days())
    }

    /// Credit a completion on `today`.
    ///
    /// A date earlier than the last completion (clock moved back) counts as
    /// the same day.
    pub fn advance(&mut self, today: NaiveDate) -> StreakTransition {
        let transition = match self.days_since_last(today) {
            None => {
                self.current_streak = 1;
                StreakTransition::Started
            }
            Some(1) => {
                self.current_streak += 1;
                StreakTransition::Continued
            }
            Some(days) if days > 1 => {
                self.current_streak = 1;
                StreakTransition::Broken
            }
            Some(_) => StreakTransition::SameDay,
        };
        self.last_completion_date = Some(today);
        self.max_streak = self.max_streak.max(self.current_streak);
        transition
    }
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// The event achievements are evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AchievementTrigger {
    /// Level that was just completed.
    pub completed_level: Option<u32>,
    /// Quiz percentage that was just achieved.
    pub quiz_score: Option<u32>,
}

impl AchievementTrigger {
    pub fn level_completed(level_id: u32) -> Self {
        Self {
            completed_level: Some(level_id),
            quiz_score: None,
        }
    }

    pub fn quiz_scored(percent: u32) -> Self {
        Self {
            completed_level: None,
            quiz_score: Some(percent),
        }
    }
}

impl Achievement {
    /// Whether this achievement's condition holds. Ignores whether it is
    /// already unlocked.
    pub fn is_earned(
        &self,
        profile: &LearnerProfile,
        curriculum: &Curriculum,
        trigger: AchievementTrigger,
    ) -> bool {
        match self.kind {
            AchievementKind::LevelComplete => trigger.completed_level == Some(self.value),
            AchievementKind::TierComplete => {
                curriculum.tier_complete(self.value, &profile.completed_levels)
            }
            AchievementKind::QuizScore => trigger.quiz_score.is_some_and(|s| s >= self.value),
            AchievementKind::Unknown => false,
        }
    }
}

/// Achievements newly earned by `trigger`, in catalog order.
///
/// Already-unlocked ids and repeated catalog ids are skipped.
pub fn evaluate_achievements<'a>(
    profile: &LearnerProfile,
    catalog: &'a AchievementCatalog,
    curriculum: &Curriculum,
    trigger: AchievementTrigger,
) -> Vec<&'a Achievement> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut earned = Vec::new();
    for achievement in &catalog.achievements {
        if profile.unlocked_achievements.contains(&achievement.id)
            || !seen.insert(achievement.id.as_str())
        {
            continue;
        }
        if achievement.is_earned(profile, curriculum, trigger) {
            earned.push(achievement);
        }
    }
    earned
}

impl LearnerProfile {
    /// Unlock an achievement and grant its points.
    ///
    /// Returns `false` without granting anything if it was already unlocked.
    pub fn unlock(&mut self, achievement: &Achievement) -> bool {
        if !self.unlocked_achievements.insert(achievement.id.clone()) {
            return false;
        }
        self.grant_xp(achievement.points);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn level(id: u32, tier: u32) -> Level {
        Level {
            id,
            title: format!("Level {id}"),
            description: String::new(),
            tier,
            concept: None,
            difficulty: None,
            xp: None,
            quiz: vec![],
        }
    }

    fn achievement(id: &str, kind: AchievementKind, value: u32, points: u32) -> Achievement {
        Achievement {
            id: id.into(),
            kind,
            value,
            points,
            title: id.into(),
            description: String::new(),
        }
    }

    #[test]
    fn xp_never_goes_negative() {
        let mut profile = LearnerProfile::default();
        assert_eq!(profile.grant_xp(10), 10);
        assert_eq!(profile.deduct_xp(4), 6);
        assert_eq!(profile.deduct_xp(100), 0);
        assert_eq!(profile.deduct_xp(1), 0);
        assert_eq!(profile.grant_xp(3), 3);
    }

    #[test]
    fn first_completion_starts_streak() {
        let mut streak = StreakState::default();
        assert_eq!(streak.advance(date(2024, 5, 1)), StreakTransition::Started);
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.max_streak, 1);
        assert_eq!(streak.last_completion_date, Some(date(2024, 5, 1)));
    }

    #[test]
    fn consecutive_day_continues_and_same_day_is_unchanged() {
        let mut streak = StreakState {
            current_streak: 3,
            max_streak: 3,
            last_completion_date: Some(date(2024, 5, 1)),
        };
        assert_eq!(streak.advance(date(2024, 5, 2)), StreakTransition::Continued);
        assert_eq!(streak.current_streak, 4);
        assert_eq!(streak.max_streak, 4);

        assert_eq!(streak.advance(date(2024, 5, 2)), StreakTransition::SameDay);
        assert_eq!(streak.current_streak, 4);
    }

    #[test]
    fn gap_breaks_streak_but_keeps_max() {
        let mut streak = StreakState {
            current_streak: 2,
            max_streak: 7,
            last_completion_date: Some(date(2024, 5, 1)),
        };
        assert_eq!(streak.advance(date(2024, 5, 6)), StreakTransition::Broken);
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.max_streak, 7);
        assert_eq!(streak.last_completion_date, Some(date(2024, 5, 6)));
    }

    #[test]
    fn streak_crosses_month_boundary() {
        let mut streak = StreakState::default();
        streak.advance(date(2024, 1, 31));
        assert_eq!(streak.advance(date(2024, 2, 1)), StreakTransition::Continued);
        assert_eq!(streak.current_streak, 2);
    }

    #[test]
    fn level_and_quiz_triggers() {
        let curriculum = Curriculum::new(vec![level(1, 1)]);
        let catalog = AchievementCatalog::new(vec![
            achievement("first", AchievementKind::LevelComplete, 1, 50),
            achievement("ace", AchievementKind::QuizScore, 90, 20),
        ]);
        let profile = LearnerProfile::default();

        let earned = evaluate_achievements(
            &profile,
            &catalog,
            &curriculum,
            AchievementTrigger::level_completed(1),
        );
        assert_eq!(earned.len(), 1);
        assert_eq!(earned[0].id, "first");

        let earned = evaluate_achievements(
            &profile,
            &catalog,
            &curriculum,
            AchievementTrigger::quiz_scored(89),
        );
        assert!(earned.is_empty());

        let earned = evaluate_achievements(
            &profile,
            &catalog,
            &curriculum,
            AchievementTrigger::quiz_scored(90),
        );
        assert_eq!(earned[0].id, "ace");
    }

    #[test]
    fn tier_requires_every_level() {
        let curriculum = Curriculum::new(vec![level(1, 1), level(2, 1), level(3, 2)]);
        let catalog = AchievementCatalog::new(vec![
            achievement("tier1", AchievementKind::TierComplete, 1, 100),
            achievement("tier9", AchievementKind::TierComplete, 9, 100),
        ]);
        let mut profile = LearnerProfile::default();
        profile.completed_levels.insert(1);
        let trigger = AchievementTrigger::level_completed(1);
        assert!(evaluate_achievements(&profile, &catalog, &curriculum, trigger).is_empty());

        profile.completed_levels.insert(2);
        let earned = evaluate_achievements(&profile, &catalog, &curriculum, trigger);
        assert_eq!(earned.len(), 1);
        assert_eq!(earned[0].id, "tier1");
    }

    #[test]
    fn unlock_is_idempotent() {
        let first = achievement("first", AchievementKind::LevelComplete, 1, 50);
        let mut profile = LearnerProfile::default();

        assert!(profile.unlock(&first));
        assert!(!profile.unlock(&first));
        assert_eq!(profile.unlocked_achievements.len(), 1);
        assert_eq!(profile.xp, 50);

        let catalog = AchievementCatalog::new(vec![first.clone(), first]);
        let curriculum = Curriculum::new(vec![level(1, 1)]);
        let earned = evaluate_achievements(
            &profile,
            &catalog,
            &curriculum,
            AchievementTrigger::level_completed(1),
        );
        assert!(earned.is_empty());
    }

    #[test]
    fn duplicate_catalog_ids_unlock_once() {
        let first = achievement("first", AchievementKind::LevelComplete, 1, 50);
        let catalog = AchievementCatalog::new(vec![first.clone(), first]);
        let curriculum = Curriculum::new(vec![level(1, 1)]);
        let earned = evaluate_achievements(
            &LearnerProfile::default(),
            &catalog,
            &curriculum,
            AchievementTrigger::level_completed(1),
        );
        assert_eq!(earned.len(), 1);
    }

    #[test]
    fn reward_config_defaults_fill_missing_fields() {
        let config: RewardConfig = serde_json::from_str(r#"{"hint_penalty": 15}"#).unwrap();
        assert_eq!(config.hint_penalty, 15);
        assert_eq!(config.xp_per_tier, 20);
        assert_eq!(config.quiz_xp_min_score, 80);
        assert_eq!(config.good_score_xp, 5);
    }

    #[test]
    fn level_xp_scales_with_tier_unless_overridden() {
        let config = RewardConfig::default();
        assert_eq!(config.level_xp(&level(1, 1)), 20);
        assert_eq!(config.level_xp(&level(4, 2)), 40);
        assert_eq!(config.level_xp(&level(9, 3)), 60);

        let mut custom = level(5, 2);
        custom.xp = Some(250);
        assert_eq!(config.level_xp(&custom), 250);
    }

    #[test]
    fn quiz_xp_needs_eighty_percent() {
        let config = RewardConfig::default();
        assert_eq!(config.quiz_xp(25), 0);
        assert_eq!(config.quiz_xp(79), 0);
        assert_eq!(config.quiz_xp(80), 8);
        assert_eq!(config.quiz_xp(89), 8);
        assert_eq!(config.quiz_xp(100), 10);

        let no_divisor = RewardConfig {
            quiz_xp_divisor: 0,
            ..RewardConfig::default()
        };
        assert_eq!(no_divisor.quiz_xp(100), 0);
    }

    #[test]
    fn good_score_threshold() {
        let config = RewardConfig::default();
        assert!(!config.is_good_score(69));
        assert!(config.is_good_score(70));
        assert!(config.is_good_score(100));
    }
}
