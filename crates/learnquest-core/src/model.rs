//! Core data model types for learnquest.
//!
//! These are the records persisted for every learner: the profile itself,
//! the raw attempt history and the missed-question queue used for practice.
//! Field names serialize in camelCase to keep the stored blob compatible with
//! the browser's local-storage layout.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Everything tracked for one learner identity.
///
/// Every field falls back to its zero value when absent from storage, so a
/// profile written by an older build still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LearnerProfile {
    /// Experience points. Never negative.
    pub xp: u32,
    /// Levels the learner has finished. Only ever grows.
    pub completed_levels: BTreeSet<u32>,
    /// Achievement ids already unlocked. Only ever grows.
    pub unlocked_achievements: BTreeSet<String>,
    /// Day-streak bookkeeping.
    pub streak: StreakState,
    /// Most recent quiz attempts, oldest first.
    pub attempt_log: Vec<AttemptRecord>,
    /// Questions answered wrong, queued for practice.
    pub missed_questions: Vec<MissedQuestionRecord>,
    /// Number of hints taken.
    pub hints_used: u32,
}

/// Consecutive-day completion streak.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub max_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completion_date: Option<NaiveDate>,
}

/// One submitted quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub level_id: u32,
    pub question_index: usize,
    pub is_correct: bool,
    /// Curriculum topic the question exercises.
    #[serde(default)]
    pub concept: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub timestamp: DateTime<Utc>,
}

/// A question the learner got wrong, kept for later practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedQuestionRecord {
    pub level_id: u32,
    pub question_index: usize,
    /// Question text as shown to the learner.
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub user_answer: Answer,
    pub correct_answer: Answer,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub practiced: bool,
    #[serde(default)]
    pub practiced_correctly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_practiced: Option<DateTime<Utc>>,
}

impl MissedQuestionRecord {
    /// The identity of a missed question within a profile.
    pub fn key(&self) -> (u32, usize) {
        (self.level_id, self.question_index)
    }

    /// A record stays in the practice pool until it has been practiced and
    /// answered correctly.
    pub fn needs_practice(&self) -> bool {
        !self.practiced || !self.practiced_correctly
    }
}

/// The displayable part of a quiz question, captured when it is missed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Difficulty band of a question or level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Difficulty implied by a curriculum tier.
    pub fn for_tier(tier: u32) -> Self {
        match tier {
            0 | 1 => Difficulty::Beginner,
            2 => Difficulty::Intermediate,
            _ => Difficulty::Advanced,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" | "easy" => Ok(Difficulty::Beginner),
            "intermediate" | "medium" => Ok(Difficulty::Intermediate),
            "advanced" | "hard" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// An answer to a quiz question: one option index, or several for
/// multiple-choice questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(usize),
    Multiple(Vec<usize>),
}

impl Answer {
    /// Selected option indices, sorted and deduplicated.
    pub fn indices(&self) -> Vec<usize> {
        let mut indices = match self {
            Answer::Single(i) => vec![*i],
            Answer::Multiple(v) => v.clone(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Order-insensitive comparison; `Single(2)` matches `Multiple([2])`.
    pub fn matches(&self, other: &Answer) -> bool {
        self.indices() == other.indices()
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Single(i) => write!(f, "{i}"),
            Answer::Multiple(v) => {
                let parts: Vec<String> = v.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", parts.join("+"))
            }
        }
    }
}

impl FromStr for Answer {
    type Err = String;

    /// Parses `"2"` as a single answer and `"0+2"` as a multi-select answer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_index = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid answer index: {:?}", part.trim()))
        };
        if s.contains('+') {
            let indices = s.split('+').map(parse_index).collect::<Result<Vec<_>, _>>()?;
            Ok(Answer::Multiple(indices))
        } else {
            Ok(Answer::Single(parse_index(s)?))
        }
    }
}

/// A shallow, field-level update to a stored profile.
///
/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub xp: Option<u32>,
    pub completed_levels: Option<BTreeSet<u32>>,
    pub unlocked_achievements: Option<BTreeSet<String>>,
    pub streak: Option<StreakState>,
    pub attempt_log: Option<Vec<AttemptRecord>>,
    pub missed_questions: Option<Vec<MissedQuestionRecord>>,
    pub hints_used: Option<u32>,
}

impl ProfileUpdate {
    /// An update that only sets `xp`.
    pub fn xp(xp: u32) -> Self {
        Self {
            xp: Some(xp),
            ..Default::default()
        }
    }

    /// Merge the provided fields into `profile`.
    pub fn apply(self, profile: &mut LearnerProfile) {
        if let Some(xp) = self.xp {
            profile.xp = xp;
        }
        if let Some(levels) = self.completed_levels {
            profile.completed_levels = levels;
        }
        if let Some(achievements) = self.unlocked_achievements {
            profile.unlocked_achievements = achievements;
        }
        if let Some(streak) = self.streak {
            profile.streak = streak;
        }
        if let Some(log) = self.attempt_log {
            profile.attempt_log = log;
        }
        if let Some(missed) = self.missed_questions {
            profile.missed_questions = missed;
        }
        if let Some(hints) = self.hints_used {
            profile.hints_used = hints;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Advanced.to_string(), "advanced");
        assert_eq!(
            "Intermediate".parse::<Difficulty>().unwrap(),
            Difficulty::Intermediate
        );
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Beginner);
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn difficulty_from_tier() {
        assert_eq!(Difficulty::for_tier(1), Difficulty::Beginner);
        assert_eq!(Difficulty::for_tier(2), Difficulty::Intermediate);
        assert_eq!(Difficulty::for_tier(5), Difficulty::Advanced);
    }

    #[test]
    fn answer_parse_and_match() {
        let single: Answer = "2".parse().unwrap();
        assert_eq!(single, Answer::Single(2));
        let multi: Answer = "3+0".parse().unwrap();
        assert_eq!(multi, Answer::Multiple(vec![3, 0]));
        assert!(multi.matches(&Answer::Multiple(vec![0, 3])));
        assert!(single.matches(&Answer::Multiple(vec![2])));
        assert!(!single.matches(&multi));
        assert!("x".parse::<Answer>().is_err());
        assert_eq!(multi.to_string(), "3+0");
    }

    #[test]
    fn answer_json_shapes() {
        let single: Answer = serde_json::from_str("1").unwrap();
        assert_eq!(single, Answer::Single(1));
        let multi: Answer = serde_json::from_str("[0, 2]").unwrap();
        assert_eq!(multi, Answer::Multiple(vec![0, 2]));
    }

    #[test]
    fn profile_missing_fields_default() {
        let profile: LearnerProfile = serde_json::from_str(r#"{"xp": 40}"#).unwrap();
        assert_eq!(profile.xp, 40);
        assert!(profile.completed_levels.is_empty());
        assert_eq!(profile.streak, StreakState::default());
        assert!(profile.attempt_log.is_empty());
    }

    #[test]
    fn profile_uses_camel_case_keys() {
        let mut profile = LearnerProfile::default();
        profile.completed_levels.insert(1);
        profile.streak.current_streak = 2;
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["completedLevels"], serde_json::json!([1]));
        assert_eq!(json["streak"]["currentStreak"], 2);
        assert!(json["streak"].get("lastCompletionDate").is_none());
    }

    #[test]
    fn update_merges_only_provided_fields() {
        let mut profile = LearnerProfile {
            xp: 10,
            hints_used: 2,
            ..Default::default()
        };
        profile.completed_levels.insert(1);

        ProfileUpdate::xp(50).apply(&mut profile);
        assert_eq!(profile.xp, 50);
        assert_eq!(profile.hints_used, 2);
        assert!(profile.completed_levels.contains(&1));
    }
}
