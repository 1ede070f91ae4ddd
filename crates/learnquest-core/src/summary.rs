//! Progress summaries and the local leaderboard.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::Curriculum;
use crate::model::LearnerProfile;

/// XP per learner level.
pub const XP_PER_LEVEL: u32 = 100;

/// Learner level for an XP total; starts at 1.
pub fn xp_level(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

/// Headline numbers for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub identity: String,
    pub xp: u32,
    pub xp_level: u32,
    pub completed_levels: usize,
    pub total_levels: usize,
    /// Share of curriculum levels completed, percent.
    pub completion_percent: u32,
    /// Lifetime quiz accuracy over the attempt log, percent. `None` before
    /// the first attempt.
    pub accuracy_percent: Option<u32>,
    pub attempts: usize,
    pub current_streak: u32,
    pub max_streak: u32,
    pub last_completion_date: Option<NaiveDate>,
    pub achievements: usize,
    pub pending_practice: usize,
    pub hints_used: u32,
}

impl ProfileSummary {
    pub fn from_profile(identity: &str, profile: &LearnerProfile, curriculum: &Curriculum) -> Self {
        let total_levels = curriculum.len();
        // Only count levels the curriculum still knows about.
        let completed_levels = if curriculum.is_empty() {
            profile.completed_levels.len()
        } else {
            profile
                .completed_levels
                .iter()
                .filter(|id| curriculum.level(**id).is_some())
                .count()
        };
        let completion_percent = if total_levels == 0 {
            0
        } else {
            ((completed_levels as f64 / total_levels as f64) * 100.0).round() as u32
        };

        let attempts = profile.attempt_log.len();
        let accuracy_percent = (attempts > 0).then(|| {
            let correct = profile.attempt_log.iter().filter(|a| a.is_correct).count();
            ((correct as f64 / attempts as f64) * 100.0).round() as u32
        });

        Self {
            identity: identity.to_string(),
            xp: profile.xp,
            xp_level: xp_level(profile.xp),
            completed_levels,
            total_levels,
            completion_percent,
            accuracy_percent,
            attempts,
            current_streak: profile.streak.current_streak,
            max_streak: profile.streak.max_streak,
            last_completion_date: profile.streak.last_completion_date,
            achievements: profile.unlocked_achievements.len(),
            pending_practice: profile.pending_practice_count(),
            hints_used: profile.hints_used,
        }
    }
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub identity: String,
    pub xp: u32,
    pub xp_level: u32,
    pub completed_levels: usize,
    pub max_streak: u32,
    pub achievements: usize,
}

/// Rank profiles by XP, then completed levels, then identity.
pub fn rank_profiles<'a>(
    profiles: impl IntoIterator<Item = (&'a str, &'a LearnerProfile)>,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<(&str, &LearnerProfile)> = profiles.into_iter().collect();
    rows.sort_by(|(id_a, a), (id_b, b)| compare_standing(id_a, a, id_b, b));

    rows.into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (identity, profile))| LeaderboardEntry {
            rank: i + 1,
            identity: identity.to_string(),
            xp: profile.xp,
            xp_level: xp_level(profile.xp),
            completed_levels: profile.completed_levels.len(),
            max_streak: profile.streak.max_streak,
            achievements: profile.unlocked_achievements.len(),
        })
        .collect()
}

fn compare_standing(
    id_a: &str,
    a: &LearnerProfile,
    id_b: &str,
    b: &LearnerProfile,
) -> Ordering {
    b.xp.cmp(&a.xp)
        .then_with(|| b.completed_levels.len().cmp(&a.completed_levels.len()))
        .then_with(|| id_a.cmp(id_b))
}
