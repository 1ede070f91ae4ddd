//! Central tracker.
//!
//! Binds a progress store to a clock, a notifier and the reward amounts, and
//! exposes every learner-facing operation as one read-modify-write against
//! the store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Achievement, AchievementCatalog, Curriculum};
use crate::error::TrackerError;
use crate::mastery::{self, WeaknessReport};
use crate::model::{
    Answer, AttemptRecord, Difficulty, LearnerProfile, MissedQuestionRecord, QuestionPayload,
    StreakState,
};
use crate::quiz::{self, GradedQuiz};
use crate::rewards::{evaluate_achievements, AchievementTrigger, RewardConfig, StreakTransition};
use crate::store::ProgressStore;
use crate::summary::{rank_profiles, LeaderboardEntry, ProfileSummary};
use crate::traits::{Clock, RewardNotifier};

/// Result of a streak update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakUpdate {
    pub streak: StreakState,
    pub transition: StreakTransition,
}

/// Result of completing a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCompletion {
    pub level_id: u32,
    /// `false` when the level had already been completed.
    pub first_completion: bool,
    pub level_xp: u32,
    pub achievement_xp: u32,
    pub new_achievements: Vec<Achievement>,
    pub streak: StreakUpdate,
    pub total_xp: u32,
}

/// Result of completing a level straight from a good quiz score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodScoreCompletion {
    pub level_id: u32,
    pub score_percent: u32,
    /// `false` when the level had already been completed.
    pub first_completion: bool,
    pub level_xp: u32,
    pub achievement_xp: u32,
    pub new_achievements: Vec<Achievement>,
    pub total_xp: u32,
}

/// Result of submitting a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub graded: GradedQuiz,
    /// Zero below the configured minimum score.
    pub quiz_xp: u32,
    pub achievement_xp: u32,
    pub new_achievements: Vec<Achievement>,
    pub total_xp: u32,
}

/// The learner progress tracker.
pub struct Tracker {
    store: ProgressStore,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn RewardNotifier>,
    config: RewardConfig,
}

impl Tracker {
    pub fn new(
        store: ProgressStore,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn RewardNotifier>,
        config: RewardConfig,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            config,
        }
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// The learner's current profile.
    pub fn profile(&self, identity: &str) -> LearnerProfile {
        self.store.read(identity)
    }

    /// Forget everything about a learner.
    pub fn reset(&self, identity: &str) -> Result<bool, TrackerError> {
        self.store.erase(identity)
    }

    // -----------------------------------------------------------------------
    // Attempt log
    // -----------------------------------------------------------------------

    /// Log one answered question.
    pub fn record_attempt(
        &self,
        identity: &str,
        level_id: u32,
        question_index: usize,
        is_correct: bool,
        concept: &str,
        difficulty: Difficulty,
    ) -> Result<(), TrackerError> {
        let record = AttemptRecord {
            level_id,
            question_index,
            is_correct,
            concept: concept.to_string(),
            difficulty,
            timestamp: self.clock.now(),
        };
        self.store
            .update(identity, |profile| profile.push_attempt(record))?;
        tracing::debug!(
            "recorded attempt {identity} L{level_id}Q{question_index} correct={is_correct}"
        );
        Ok(())
    }

    /// Queue a wrongly answered question for practice.
    pub fn record_miss(
        &self,
        identity: &str,
        level_id: u32,
        question_index: usize,
        payload: QuestionPayload,
        user_answer: Answer,
        correct_answer: Answer,
    ) -> Result<(), TrackerError> {
        let record = MissedQuestionRecord {
            level_id,
            question_index,
            question: payload.question,
            options: payload.options,
            user_answer,
            correct_answer,
            timestamp: self.clock.now(),
            practiced: false,
            practiced_correctly: false,
            last_practiced: None,
        };
        let replaced = self
            .store
            .update(identity, |profile| profile.upsert_miss(record))?;
        tracing::debug!(
            "recorded miss {identity} L{level_id}Q{question_index} (replaced: {replaced})"
        );
        Ok(())
    }

    /// Up to `limit` missed questions to practice, newest first.
    pub fn select_practice_set(&self, identity: &str, limit: usize) -> Vec<MissedQuestionRecord> {
        self.store.read(identity).practice_set(limit)
    }

    /// Record a practice result. Returns `false` if the question was never
    /// missed; nothing is written in that case.
    pub fn mark_practiced(
        &self,
        identity: &str,
        level_id: u32,
        question_index: usize,
        was_correct: bool,
    ) -> Result<bool, TrackerError> {
        let queued = self
            .store
            .read(identity)
            .missed_questions
            .iter()
            .any(|m| m.key() == (level_id, question_index));
        if !queued {
            tracing::debug!("no missed question {identity} L{level_id}Q{question_index}");
            return Ok(false);
        }

        let now = self.clock.now();
        self.store.update(identity, |profile| {
            profile.mark_practiced(level_id, question_index, was_correct, now)
        })
    }

    // -----------------------------------------------------------------------
    // Mastery
    // -----------------------------------------------------------------------

    /// Concepts that most need review.
    pub fn analyze_weaknesses(&self, identity: &str) -> WeaknessReport {
        mastery::analyze(&self.store.read(identity).attempt_log)
    }

    // -----------------------------------------------------------------------
    // Rewards
    // -----------------------------------------------------------------------

    /// Add XP. Returns the new total.
    pub fn grant_xp(&self, identity: &str, amount: u32) -> Result<u32, TrackerError> {
        let total = self
            .store
            .update(identity, |profile| profile.grant_xp(amount))?;
        self.notifier
            .on_xp_changed(identity, i64::from(amount), total);
        Ok(total)
    }

    /// Remove XP, never going below zero. Returns the new total.
    pub fn deduct_xp(&self, identity: &str, amount: u32) -> Result<u32, TrackerError> {
        let (before, total) = self.store.update(identity, |profile| {
            let before = profile.xp;
            (before, profile.deduct_xp(amount))
        })?;
        self.notifier
            .on_xp_changed(identity, i64::from(total) - i64::from(before), total);
        Ok(total)
    }

    /// Take a hint: costs the configured penalty. Returns the new total.
    pub fn use_hint(&self, identity: &str) -> Result<u32, TrackerError> {
        let penalty = self.config.hint_penalty;
        let (before, total) = self.store.update(identity, |profile| {
            profile.hints_used += 1;
            let before = profile.xp;
            (before, profile.deduct_xp(penalty))
        })?;
        tracing::debug!("{identity} used a hint (-{penalty} XP)");
        self.notifier
            .on_xp_changed(identity, i64::from(total) - i64::from(before), total);
        Ok(total)
    }

    /// Credit today's completion to the learner's streak.
    pub fn update_streak(&self, identity: &str) -> Result<StreakUpdate, TrackerError> {
        let today = self.clock.today();
        self.store.update(identity, |profile| {
            let transition = profile.streak.advance(today);
            StreakUpdate {
                streak: profile.streak.clone(),
                transition,
            }
        })
    }

    /// Unlock every achievement `trigger` newly earns and grant its points.
    pub fn evaluate_achievements(
        &self,
        identity: &str,
        catalog: &AchievementCatalog,
        curriculum: &Curriculum,
        trigger: AchievementTrigger,
    ) -> Result<Vec<Achievement>, TrackerError> {
        let current = self.store.read(identity);
        if evaluate_achievements(&current, catalog, curriculum, trigger).is_empty() {
            return Ok(Vec::new());
        }

        let (unlocked, points, total) = self.store.update(identity, |profile| {
            let (unlocked, points) = unlock_earned(profile, catalog, curriculum, trigger);
            (unlocked, points, profile.xp)
        })?;
        self.announce_unlocks(identity, &unlocked, points, total);
        Ok(unlocked)
    }

    /// Mark a level complete: grant its XP on first completion, advance the
    /// streak and unlock achievements.
    ///
    /// Prerequisites are not checked here; see [`Curriculum::is_unlocked`].
    pub fn complete_level(
        &self,
        identity: &str,
        level_id: u32,
        curriculum: &Curriculum,
        catalog: &AchievementCatalog,
    ) -> Result<LevelCompletion, TrackerError> {
        let level = curriculum
            .level(level_id)
            .ok_or(TrackerError::UnknownLevel(level_id))?;
        let reward = self.config.level_xp(level);
        let today = self.clock.today();
        let trigger = AchievementTrigger::level_completed(level_id);

        let (completion, xp_after_level) = self.store.update(identity, |profile| {
            let first_completion = profile.completed_levels.insert(level_id);
            let level_xp = if first_completion { reward } else { 0 };
            let xp_after_level = profile.grant_xp(level_xp);

            let transition = profile.streak.advance(today);
            let (new_achievements, achievement_xp) =
                unlock_earned(profile, catalog, curriculum, trigger);

            let completion = LevelCompletion {
                level_id,
                first_completion,
                level_xp,
                achievement_xp,
                new_achievements,
                streak: StreakUpdate {
                    streak: profile.streak.clone(),
                    transition,
                },
                total_xp: profile.xp,
            };
            (completion, xp_after_level)
        })?;

        tracing::info!(
            "{identity} completed level {level_id} (+{} XP, streak {})",
            completion.level_xp,
            completion.streak.streak.current_streak
        );
        if completion.level_xp > 0 {
            self.notifier.on_xp_changed(
                identity,
                i64::from(completion.level_xp),
                xp_after_level,
            );
        }
        self.announce_unlocks(
            identity,
            &completion.new_achievements,
            completion.achievement_xp,
            completion.total_xp,
        );
        self.notifier
            .on_level_completed(identity, level_id, &completion.streak.streak);
        Ok(completion)
    }

    /// Complete a level from a quiz score at or above the good-score
    /// threshold. Grants the good-score XP on first completion and unlocks
    /// level achievements; the streak is left alone.
    pub fn proceed_with_good_score(
        &self,
        identity: &str,
        level_id: u32,
        score_percent: u32,
        curriculum: &Curriculum,
        catalog: &AchievementCatalog,
    ) -> Result<GoodScoreCompletion, TrackerError> {
        if curriculum.level(level_id).is_none() {
            return Err(TrackerError::UnknownLevel(level_id));
        }
        if !self.config.is_good_score(score_percent) {
            return Err(TrackerError::ScoreTooLow {
                level_id,
                score: score_percent,
                required: self.config.good_score_threshold,
            });
        }
        let reward = self.config.good_score_xp;
        let trigger = AchievementTrigger::level_completed(level_id);

        let (completion, xp_after_level) = self.store.update(identity, |profile| {
            let first_completion = profile.completed_levels.insert(level_id);
            let level_xp = if first_completion { reward } else { 0 };
            let xp_after_level = profile.grant_xp(level_xp);
            let (new_achievements, achievement_xp) =
                unlock_earned(profile, catalog, curriculum, trigger);

            let completion = GoodScoreCompletion {
                level_id,
                score_percent,
                first_completion,
                level_xp,
                achievement_xp,
                new_achievements,
                total_xp: profile.xp,
            };
            (completion, xp_after_level)
        })?;

        tracing::info!(
            "{identity} completed level {level_id} with {score_percent}% (+{} XP)",
            completion.level_xp
        );
        if completion.level_xp > 0 {
            self.notifier.on_xp_changed(
                identity,
                i64::from(completion.level_xp),
                xp_after_level,
            );
        }
        self.announce_unlocks(
            identity,
            &completion.new_achievements,
            completion.achievement_xp,
            completion.total_xp,
        );
        Ok(completion)
    }

    /// Grade a quiz, log every answer, queue misses for practice, grant
    /// quiz XP for a high enough score and unlock score achievements.
    pub fn submit_quiz(
        &self,
        identity: &str,
        level_id: u32,
        answers: &[Answer],
        curriculum: &Curriculum,
        catalog: &AchievementCatalog,
    ) -> Result<QuizOutcome, TrackerError> {
        let level = curriculum
            .level(level_id)
            .ok_or(TrackerError::UnknownLevel(level_id))?;
        let graded = quiz::grade(level, answers)?;
        let now = self.clock.now();
        let difficulty = level.difficulty();
        let quiz_xp = self.config.quiz_xp(graded.score_percent);
        let trigger = AchievementTrigger::quiz_scored(graded.score_percent);

        let (new_achievements, achievement_xp, xp_after_quiz, total_xp) =
            self.store.update(identity, |profile| {
                for result in &graded.questions {
                    profile.push_attempt(AttemptRecord {
                        level_id,
                        question_index: result.question_index,
                        is_correct: result.is_correct,
                        concept: result.concept.clone(),
                        difficulty,
                        timestamp: now,
                    });
                    if !result.is_correct {
                        let question = &level.quiz[result.question_index];
                        profile.upsert_miss(MissedQuestionRecord {
                            level_id,
                            question_index: result.question_index,
                            question: question.q.clone(),
                            options: question.options.clone(),
                            user_answer: result.submitted.clone(),
                            correct_answer: result.expected.clone(),
                            timestamp: now,
                            practiced: false,
                            practiced_correctly: false,
                            last_practiced: None,
                        });
                    }
                }
                let xp_after_quiz = profile.grant_xp(quiz_xp);
                let (unlocked, points) = unlock_earned(profile, catalog, curriculum, trigger);
                (unlocked, points, xp_after_quiz, profile.xp)
            })?;

        tracing::info!(
            "{identity} scored {}% on level {level_id} ({}/{})",
            graded.score_percent,
            graded.correct,
            graded.total()
        );
        if quiz_xp > 0 {
            self.notifier
                .on_xp_changed(identity, i64::from(quiz_xp), xp_after_quiz);
        }
        self.announce_unlocks(identity, &new_achievements, achievement_xp, total_xp);

        Ok(QuizOutcome {
            graded,
            quiz_xp,
            achievement_xp,
            new_achievements,
            total_xp,
        })
    }

    // -----------------------------------------------------------------------
    // Reporting
    // -----------------------------------------------------------------------

    pub fn summary(&self, identity: &str, curriculum: &Curriculum) -> ProfileSummary {
        ProfileSummary::from_profile(identity, &self.store.read(identity), curriculum)
    }

    /// The top `limit` learners in this store.
    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let profiles: Vec<(String, LearnerProfile)> = self
            .store
            .identities()
            .into_iter()
            .map(|id| {
                let profile = self.store.read(&id);
                (id, profile)
            })
            .collect();
        rank_profiles(profiles.iter().map(|(id, p)| (id.as_str(), p)), limit)
    }

    fn announce_unlocks(&self, identity: &str, unlocked: &[Achievement], points: u32, total: u32) {
        for achievement in unlocked {
            tracing::info!(
                "{identity} unlocked '{}' (+{} XP)",
                achievement.id,
                achievement.points
            );
            self.notifier.on_achievement_unlocked(identity, achievement);
        }
        if points > 0 {
            self.notifier
                .on_xp_changed(identity, i64::from(points), total);
        }
    }
}

/// Unlock what `trigger` earns on `profile`. Returns the unlocked
/// achievements and the XP they granted.
fn unlock_earned(
    profile: &mut LearnerProfile,
    catalog: &AchievementCatalog,
    curriculum: &Curriculum,
    trigger: AchievementTrigger,
) -> (Vec<Achievement>, u32) {
    let earned: Vec<Achievement> = evaluate_achievements(profile, catalog, curriculum, trigger)
        .into_iter()
        .cloned()
        .collect();

    let mut points = 0u32;
    let mut unlocked = Vec::with_capacity(earned.len());
    for achievement in earned {
        if profile.unlock(&achievement) {
            points = points.saturating_add(achievement.points);
            unlocked.push(achievement);
        }
    }
    (unlocked, points)
}
