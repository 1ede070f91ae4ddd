//! Quiz grading.

use serde::{Deserialize, Serialize};

use crate::catalog::Level;
use crate::error::TrackerError;
use crate::model::Answer;

/// Grading of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedQuestion {
    pub question_index: usize,
    pub concept: String,
    pub submitted: Answer,
    pub expected: Answer,
    pub is_correct: bool,
}

/// Grading of a whole answer sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedQuiz {
    pub level_id: u32,
    pub questions: Vec<GradedQuestion>,
    pub correct: usize,
    /// Rounded percentage of questions answered correctly.
    pub score_percent: u32,
}

impl GradedQuiz {
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_perfect(&self) -> bool {
        self.correct == self.total()
    }
}

/// Grade `answers` against `level`'s quiz, one answer per question.
pub fn grade(level: &Level, answers: &[Answer]) -> Result<GradedQuiz, TrackerError> {
    if level.quiz.is_empty() {
        return Err(TrackerError::EmptyQuiz(level.id));
    }
    if answers.len() != level.quiz.len() {
        return Err(TrackerError::AnswerCount {
            level_id: level.id,
            expected: level.quiz.len(),
            actual: answers.len(),
        });
    }

    let questions: Vec<GradedQuestion> = level
        .quiz
        .iter()
        .zip(answers)
        .enumerate()
        .map(|(i, (question, submitted))| GradedQuestion {
            question_index: i,
            concept: level.concept_for(question).to_string(),
            submitted: submitted.clone(),
            expected: question.answer.clone(),
            is_correct: submitted.matches(&question.answer),
        })
        .collect();

    let correct = questions.iter().filter(|q| q.is_correct).count();
    let score_percent = ((correct as f64 / questions.len() as f64) * 100.0).round() as u32;

    Ok(GradedQuiz {
        level_id: level.id,
        questions,
        correct,
        score_percent,
    })
}
