//! Curriculum and achievement catalogs.
//!
//! Both are read-only JSON content files. They may be a bare array or an
//! object wrapping the array (`{"levels": [...]}`, `{"achievements": [...]}`).

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Answer, Difficulty};

fn default_tier() -> u32 {
    1
}

/// One quiz question of a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Question text.
    pub q: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Expected answer.
    pub answer: Answer,
    /// Whether several options must be selected.
    #[serde(default)]
    pub multi: bool,
    /// Overrides the level's concept for this question.
    #[serde(default)]
    pub concept: Option<String>,
}

/// A curriculum level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_tier")]
    pub tier: u32,
    /// Concept the level teaches; defaults to the title.
    #[serde(default)]
    pub concept: Option<String>,
    /// Defaults to the difficulty implied by the tier.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// XP granted on first completion; the reward config decides if absent.
    #[serde(default)]
    pub xp: Option<u32>,
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
}

impl Level {
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
            .unwrap_or_else(|| Difficulty::for_tier(self.tier))
    }

    /// Concept label recorded for an attempt at `question`.
    pub fn concept_for<'a>(&'a self, question: &'a QuizQuestion) -> &'a str {
        question
            .concept
            .as_deref()
            .or(self.concept.as_deref())
            .unwrap_or(&self.title)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CurriculumFile {
    Bare(Vec<Level>),
    Wrapped { levels: Vec<Level> },
}

/// The ordered list of levels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Curriculum {
    pub levels: Vec<Level>,
}

impl Curriculum {
    pub fn new(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    /// Load a curriculum JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read curriculum: {}", path.display()))?;
        Self::from_json_str(&content, path)
    }

    /// Parse curriculum JSON (useful for testing).
    pub fn from_json_str(content: &str, source_path: &Path) -> Result<Self> {
        let parsed: CurriculumFile = serde_json::from_str(content)
            .with_context(|| format!("failed to parse curriculum: {}", source_path.display()))?;
        let levels = match parsed {
            CurriculumFile::Bare(levels) | CurriculumFile::Wrapped { levels } => levels,
        };
        Ok(Self { levels })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn levels_in_tier(&self, tier: u32) -> impl Iterator<Item = &Level> {
        self.levels.iter().filter(move |l| l.tier == tier)
    }

    /// `true` if the tier has at least one level and all of them are in
    /// `completed`.
    pub fn tier_complete(&self, tier: u32, completed: &BTreeSet<u32>) -> bool {
        let mut levels = self.levels_in_tier(tier).peekable();
        levels.peek().is_some() && levels.all(|l| completed.contains(&l.id))
    }

    /// Whether a learner with `completed` levels may start `level_id`:
    /// the first level is always open, every later one needs its predecessor
    /// in curriculum order.
    pub fn is_unlocked(&self, level_id: u32, completed: &BTreeSet<u32>) -> bool {
        match self.levels.iter().position(|l| l.id == level_id) {
            Some(0) => true,
            Some(pos) => completed.contains(&self.levels[pos - 1].id),
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// What an achievement is awarded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AchievementKind {
    /// `value` is a level id.
    LevelComplete,
    /// `value` is a tier number.
    TierComplete,
    /// `value` is a minimum quiz percentage.
    QuizScore,
    /// Unrecognized type from a newer catalog; never unlocks.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AchievementKind::LevelComplete => write!(f, "levelComplete"),
            AchievementKind::TierComplete => write!(f, "tierComplete"),
            AchievementKind::QuizScore => write!(f, "quizScore"),
            AchievementKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// One achievement definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AchievementKind,
    pub value: u32,
    /// XP granted on unlock.
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Bare(Vec<Achievement>),
    Wrapped { achievements: Vec<Achievement> },
}

/// All achievement definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AchievementCatalog {
    pub achievements: Vec<Achievement>,
}

impl AchievementCatalog {
    pub fn new(achievements: Vec<Achievement>) -> Self {
        Self { achievements }
    }

    /// Load an achievement catalog JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read achievements: {}", path.display()))?;
        Self::from_json_str(&content, path)
    }

    pub fn from_json_str(content: &str, source_path: &Path) -> Result<Self> {
        let parsed: CatalogFile = serde_json::from_str(content).with_context(|| {
            format!("failed to parse achievements: {}", source_path.display())
        })?;
        let achievements = match parsed {
            CatalogFile::Bare(a) | CatalogFile::Wrapped { achievements: a } => a,
        };
        Ok(Self { achievements })
    }

    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.achievements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.achievements.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The level or achievement id (if applicable).
    pub subject: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn about(subject: impl ToString, message: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a curriculum for common content mistakes.
pub fn validate_curriculum(curriculum: &Curriculum) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if curriculum.is_empty() {
        warnings.push(ValidationWarning {
            subject: None,
            message: "curriculum has no levels".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for level in &curriculum.levels {
        if !seen_ids.insert(level.id) {
            warnings.push(ValidationWarning::about(
                level.id,
                format!("duplicate level ID: {}", level.id),
            ));
        }
    }

    for level in &curriculum.levels {
        if level.quiz.is_empty() {
            warnings.push(ValidationWarning::about(level.id, "level has no quiz"));
        }

        for (i, question) in level.quiz.iter().enumerate() {
            let indices = question.answer.indices();
            if indices.is_empty() {
                warnings.push(ValidationWarning::about(
                    level.id,
                    format!("question {i} has an empty answer"),
                ));
            }
            if let Some(bad) = indices.iter().find(|&&idx| idx >= question.options.len()) {
                warnings.push(ValidationWarning::about(
                    level.id,
                    format!(
                        "question {i} answer index {bad} is out of range ({} options)",
                        question.options.len()
                    ),
                ));
            }
            if !question.multi && indices.len() > 1 {
                warnings.push(ValidationWarning::about(
                    level.id,
                    format!("question {i} has several answers but is not marked multi"),
                ));
            }
        }
    }

    warnings
}

/// Validate an achievement catalog against the curriculum it rewards.
pub fn validate_catalog(
    catalog: &AchievementCatalog,
    curriculum: &Curriculum,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for achievement in &catalog.achievements {
        if !seen_ids.insert(achievement.id.as_str()) {
            warnings.push(ValidationWarning::about(
                &achievement.id,
                format!("duplicate achievement ID: {}", achievement.id),
            ));
        }
    }

    for achievement in &catalog.achievements {
        let problem = match achievement.kind {
            AchievementKind::LevelComplete if curriculum.level(achievement.value).is_none() => {
                Some(format!("refers to unknown level {}", achievement.value))
            }
            AchievementKind::TierComplete
                if curriculum.levels_in_tier(achievement.value).next().is_none() =>
            {
                Some(format!(
                    "tier {} has no levels and can never be completed",
                    achievement.value
                ))
            }
            AchievementKind::QuizScore if achievement.value > 100 => Some(format!(
                "quiz score threshold {} is above 100%",
                achievement.value
            )),
            AchievementKind::Unknown => Some("unknown achievement type, it will never unlock".into()),
            _ => None,
        };
        if let Some(message) = problem {
            warnings.push(ValidationWarning::about(&achievement.id, message));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const LEVELS_JSON: &str = r#"
{
  "levels": [
    {
      "id": 1,
      "title": "Hello World",
      "tier": 1,
      "quiz": [
        {"q": "Entry point?", "options": ["Main", "Start"], "answer": 0},
        {"q": "Pick outputs", "options": ["Console.Write", "Print", "Console.WriteLine"], "answer": [0, 2], "multi": true, "concept": "Output"}
      ]
    },
    {"id": 2, "title": "Variables", "tier": 1, "concept": "Types", "quiz": [{"q": "int size?", "options": ["16", "32"], "answer": 1}]},
    {"id": 3, "title": "Control Flow", "tier": 2, "xp": 150, "quiz": []}
  ]
}
"#;

    fn curriculum() -> Curriculum {
        Curriculum::from_json_str(LEVELS_JSON, &PathBuf::from("levels.json")).unwrap()
    }

    #[test]
    fn parse_wrapped_curriculum() {
        let c = curriculum();
        assert_eq!(c.len(), 3);
        assert_eq!(c.level(3).unwrap().xp, Some(150));
        assert_eq!(c.level(3).unwrap().difficulty(), Difficulty::Intermediate);
        assert_eq!(c.level(1).unwrap().quiz[1].answer, Answer::Multiple(vec![0, 2]));
    }

    #[test]
    fn parse_bare_curriculum_with_defaults() {
        let json = r#"[{"id": 7, "quiz": [{"q": "?", "answer": 0}]}]"#;
        let c = Curriculum::from_json_str(json, &PathBuf::from("levels.json")).unwrap();
        let level = c.level(7).unwrap();
        assert_eq!(level.tier, 1);
        assert_eq!(level.difficulty(), Difficulty::Beginner);
        assert!(level.quiz[0].options.is_empty());
    }

    #[test]
    fn parse_malformed_curriculum() {
        let result = Curriculum::from_json_str("{levels: oops", &PathBuf::from("bad.json"));
        assert!(result.is_err());
    }

    #[test]
    fn concept_falls_back_from_question_to_level_to_title() {
        let c = curriculum();
        let hello = c.level(1).unwrap();
        assert_eq!(hello.concept_for(&hello.quiz[0]), "Hello World");
        assert_eq!(hello.concept_for(&hello.quiz[1]), "Output");
        let vars = c.level(2).unwrap();
        assert_eq!(vars.concept_for(&vars.quiz[0]), "Types");
    }

    #[test]
    fn tier_completion() {
        let c = curriculum();
        let mut completed = BTreeSet::from([1]);
        assert!(!c.tier_complete(1, &completed));
        completed.insert(2);
        assert!(c.tier_complete(1, &completed));
        assert!(!c.tier_complete(9, &completed));
    }

    #[test]
    fn unlock_follows_curriculum_order() {
        let c = curriculum();
        let completed = BTreeSet::from([1]);
        assert!(c.is_unlocked(1, &BTreeSet::new()));
        assert!(c.is_unlocked(2, &completed));
        assert!(!c.is_unlocked(3, &completed));
        assert!(!c.is_unlocked(42, &completed));
    }

    #[test]
    fn parse_achievements_bare_and_unknown_type() {
        let json = r#"[
            {"id": "first", "type": "levelComplete", "value": 1, "points": 50, "title": "First Steps"},
            {"id": "ace", "type": "quizScore", "value": 100, "points": 25},
            {"id": "future", "type": "speedRun", "value": 3}
        ]"#;
        let catalog = AchievementCatalog::from_json_str(json, &PathBuf::from("a.json")).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("first").unwrap().kind, AchievementKind::LevelComplete);
        assert_eq!(catalog.get("future").unwrap().kind, AchievementKind::Unknown);
        assert_eq!(catalog.get("future").unwrap().points, 0);
    }

    #[test]
    fn validate_curriculum_content() {
        let json = r#"[
            {"id": 1, "quiz": [{"q": "?", "options": ["a"], "answer": 3}]},
            {"id": 1, "quiz": [{"q": "?", "options": ["a", "b"], "answer": [0, 1]}]},
            {"id": 2}
        ]"#;
        let c = Curriculum::from_json_str(json, &PathBuf::from("levels.json")).unwrap();
        let warnings = validate_curriculum(&c);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate level ID")));
        assert!(warnings.iter().any(|w| w.message.contains("out of range")));
        assert!(warnings.iter().any(|w| w.message.contains("not marked multi")));
        assert!(warnings.iter().any(|w| w.message.contains("no quiz")));
    }

    #[test]
    fn validate_catalog_references() {
        let json = r#"{"achievements": [
            {"id": "x", "type": "levelComplete", "value": 99},
            {"id": "x", "type": "tierComplete", "value": 1},
            {"id": "t", "type": "tierComplete", "value": 8},
            {"id": "q", "type": "quizScore", "value": 120}
        ]}"#;
        let catalog = AchievementCatalog::from_json_str(json, &PathBuf::from("a.json")).unwrap();
        let warnings = validate_catalog(&catalog, &curriculum());
        assert!(warnings.iter().any(|w| w.message.contains("unknown level 99")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate achievement")));
        assert!(warnings.iter().any(|w| w.message.contains("tier 8")));
        assert!(warnings.iter().any(|w| w.message.contains("above 100%")));
    }
}
