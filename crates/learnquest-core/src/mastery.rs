//! Per-concept mastery analysis.
//!
//! Attempts are grouped by concept and scored with a recency-weighted
//! accuracy, so a learner who struggled early but answers well now stops
//! being flagged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::AttemptRecord;

/// Below this many attempts in total there is no report.
pub const MIN_TOTAL_ATTEMPTS: usize = 5;
/// A concept needs this many attempts before it can be flagged.
pub const MIN_CONCEPT_ATTEMPTS: usize = 3;
/// Attempts per concept that count as "recent".
pub const RECENT_WINDOW: usize = 10;
/// Weight of lifetime accuracy in the weighted score.
pub const OVERALL_WEIGHT: f64 = 0.3;
/// Weight of recent accuracy in the weighted score.
pub const RECENT_WEIGHT: f64 = 0.7;
/// Concepts with a weighted accuracy below this are weaknesses.
pub const WEAKNESS_THRESHOLD: f64 = 0.7;
/// Maximum number of weaknesses reported.
pub const MAX_WEAKNESSES: usize = 5;

/// Result of a weakness analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum WeaknessReport {
    /// Not enough attempts to say anything useful.
    #[serde(rename_all = "camelCase")]
    NeedsMoreData { total_attempts: usize },
    /// Weakest concepts first; may be empty.
    #[serde(rename_all = "camelCase")]
    Ready {
        total_attempts: usize,
        weaknesses: Vec<ConceptWeakness>,
    },
}

impl WeaknessReport {
    pub fn needs_more_data(&self) -> bool {
        matches!(self, WeaknessReport::NeedsMoreData { .. })
    }

    /// Reported weaknesses; empty when more data is needed.
    pub fn weaknesses(&self) -> &[ConceptWeakness] {
        match self {
            WeaknessReport::NeedsMoreData { .. } => &[],
            WeaknessReport::Ready { weaknesses, .. } => weaknesses,
        }
    }
}

/// Mastery figures for one concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptWeakness {
    pub concept: String,
    pub total_attempts: usize,
    pub correct: usize,
    /// Lifetime accuracy, percent.
    pub accuracy: u32,
    /// Accuracy over the last [`RECENT_WINDOW`] attempts, percent.
    pub recent_accuracy: u32,
    /// Blended accuracy as a fraction in `0.0..=1.0`.
    pub weighted_accuracy: f64,
    /// 0 (mastered) to 100 (needs the most review).
    pub weakness_score: u32,
}

/// Per-concept scoring, before thresholds are applied.
///
/// Concepts are returned in the order they first appear in `attempts`.
pub fn score_concepts(attempts: &[AttemptRecord]) -> Vec<ConceptWeakness> {
    let mut order: Vec<(&str, Vec<bool>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for attempt in attempts {
        let concept = attempt.concept.as_str();
        let slot = *index.entry(concept).or_insert_with(|| {
            order.push((concept, Vec::new()));
            order.len() - 1
        });
        order[slot].1.push(attempt.is_correct);
    }

    order
        .into_iter()
        .map(|(concept, outcomes)| score_concept(concept, &outcomes))
        .collect()
}

fn score_concept(concept: &str, outcomes: &[bool]) -> ConceptWeakness {
    let total = outcomes.len();
    let correct = outcomes.iter().filter(|&&ok| ok).count();
    let accuracy = fraction(correct, total);

    let recent = &outcomes[total.saturating_sub(RECENT_WINDOW)..];
    let recent_accuracy = if recent.is_empty() {
        accuracy
    } else {
        fraction(recent.iter().filter(|&&ok| ok).count(), recent.len())
    };

    let weighted = OVERALL_WEIGHT * accuracy + RECENT_WEIGHT * recent_accuracy;

    ConceptWeakness {
        concept: concept.to_string(),
        total_attempts: total,
        correct,
        accuracy: percent(accuracy),
        recent_accuracy: percent(recent_accuracy),
        weighted_accuracy: weighted,
        weakness_score: percent(1.0 - weighted),
    }
}

/// Rank the concepts that most need review.
pub fn analyze(attempts: &[AttemptRecord]) -> WeaknessReport {
    let total_attempts = attempts.len();
    if total_attempts < MIN_TOTAL_ATTEMPTS {
        return WeaknessReport::NeedsMoreData { total_attempts };
    }

    let mut weaknesses: Vec<ConceptWeakness> = score_concepts(attempts)
        .into_iter()
        .filter(|c| {
            c.weighted_accuracy < WEAKNESS_THRESHOLD && c.total_attempts >= MIN_CONCEPT_ATTEMPTS
        })
        .collect();

    // Stable, so equal scores keep encounter order.
    weaknesses.sort_by(|a, b| b.weakness_score.cmp(&a.weakness_score));
    weaknesses.truncate(MAX_WEAKNESSES);

    WeaknessReport::Ready {
        total_attempts,
        weaknesses,
    }
}

fn fraction(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn percent(value: f64) -> u32 {
    (value * 100.0).round().clamp(0.0, 100.0) as u32
}
