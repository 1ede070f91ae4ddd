//! Bounded attempt history and the missed-question practice queue.

use chrono::{DateTime, Utc};

use crate::model::{AttemptRecord, LearnerProfile, MissedQuestionRecord};

/// Maximum number of attempts kept per profile.
pub const MAX_ATTEMPT_LOG: usize = 1000;

/// Maximum number of missed questions kept per profile.
pub const MAX_MISSED_QUESTIONS: usize = 200;

impl LearnerProfile {
    /// Append an attempt, evicting the oldest entries beyond
    /// [`MAX_ATTEMPT_LOG`].
    pub fn push_attempt(&mut self, record: AttemptRecord) {
        self.attempt_log.push(record);
        if self.attempt_log.len() > MAX_ATTEMPT_LOG {
            let excess = self.attempt_log.len() - MAX_ATTEMPT_LOG;
            self.attempt_log.drain(..excess);
        }
    }

    /// Insert or replace the missed question with the same
    /// `(level_id, question_index)`.
    ///
    /// A replacement takes the whole record, so a re-miss puts the question
    /// back into the practice pool. Returns `true` if an entry was replaced.
    pub fn upsert_miss(&mut self, record: MissedQuestionRecord) -> bool {
        let key = record.key();
        if let Some(existing) = self.missed_questions.iter_mut().find(|m| m.key() == key) {
            *existing = record;
            return true;
        }

        self.missed_questions.push(record);
        if self.missed_questions.len() > MAX_MISSED_QUESTIONS {
            let excess = self.missed_questions.len() - MAX_MISSED_QUESTIONS;
            self.missed_questions.drain(..excess);
        }
        false
    }

    /// Up to `limit` questions still needing practice, newest first.
    pub fn practice_set(&self, limit: usize) -> Vec<MissedQuestionRecord> {
        let mut pending: Vec<&MissedQuestionRecord> = self
            .missed_questions
            .iter()
            .filter(|m| m.needs_practice())
            .collect();
        pending.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        pending.into_iter().take(limit).cloned().collect()
    }

    /// Record the outcome of practicing a missed question.
    ///
    /// Returns `false` and changes nothing if the question is not queued.
    pub fn mark_practiced(
        &mut self,
        level_id: u32,
        question_index: usize,
        was_correct: bool,
        at: DateTime<Utc>,
    ) -> bool {
        match self
            .missed_questions
            .iter_mut()
            .find(|m| m.key() == (level_id, question_index))
        {
            Some(record) => {
                record.practiced = true;
                record.practiced_correctly = was_correct;
                record.last_practiced = Some(at);
                true
            }
            None => false,
        }
    }

    /// Number of missed questions still in the practice pool.
    pub fn pending_practice_count(&self) -> usize {
        self.missed_questions
            .iter()
            .filter(|m| m.needs_practice())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::model::{Answer, Difficulty};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    fn attempt(question_index: usize) -> AttemptRecord {
        AttemptRecord {
            level_id: 1,
            question_index,
            is_correct: question_index % 2 == 0,
            concept: "Loops".into(),
            difficulty: Difficulty::Beginner,
            timestamp: at(question_index as i64),
        }
    }

    fn miss(level_id: u32, question_index: usize, secs: i64) -> MissedQuestionRecord {
        MissedQuestionRecord {
            level_id,
            question_index,
            question: format!("question {level_id}/{question_index}"),
            options: vec!["a".into(), "b".into()],
            user_answer: Answer::Single(0),
            correct_answer: Answer::Single(1),
            timestamp: at(secs),
            practiced: false,
            practiced_correctly: false,
            last_practiced: None,
        }
    }

    #[test]
    fn attempt_log_keeps_most_recent_in_order() {
        let mut profile = LearnerProfile::default();
        for i in 0..1500 {
            profile.push_attempt(attempt(i));
        }

        assert_eq!(profile.attempt_log.len(), MAX_ATTEMPT_LOG);
        assert_eq!(profile.attempt_log[0].question_index, 500);
        assert_eq!(profile.attempt_log[999].question_index, 1499);
        assert!(profile
            .attempt_log
            .windows(2)
            .all(|w| w[0].question_index + 1 == w[1].question_index));
    }

    #[test]
    fn remiss_overwrites_in_place_and_resets_practice() {
        let mut profile = LearnerProfile::default();
        profile.upsert_miss(miss(1, 0, 0));
        profile.upsert_miss(miss(1, 1, 1));
        assert!(profile.mark_practiced(1, 0, true, at(5)));

        let mut again = miss(1, 0, 10);
        again.user_answer = Answer::Single(3);
        assert!(profile.upsert_miss(again));

        assert_eq!(profile.missed_questions.len(), 2);
        let first = &profile.missed_questions[0];
        assert_eq!(first.key(), (1, 0));
        assert_eq!(first.user_answer, Answer::Single(3));
        assert!(!first.practiced);
        assert!(!first.practiced_correctly);
        assert!(first.last_practiced.is_none());
    }

    #[test]
    fn missed_questions_are_bounded() {
        let mut profile = LearnerProfile::default();
        for i in 0..250 {
            profile.upsert_miss(miss(1, i, i as i64));
        }
        assert_eq!(profile.missed_questions.len(), MAX_MISSED_QUESTIONS);
        assert_eq!(profile.missed_questions[0].question_index, 50);
    }

    #[test]
    fn practice_set_is_newest_first_and_limited() {
        let mut profile = LearnerProfile::default();
        profile.upsert_miss(miss(1, 0, 10));
        profile.upsert_miss(miss(2, 0, 30));
        profile.upsert_miss(miss(3, 0, 20));

        let set = profile.practice_set(2);
        let keys: Vec<_> = set.iter().map(|m| m.key()).collect();
        assert_eq!(keys, vec![(2, 0), (3, 0)]);
        assert!(profile.practice_set(0).is_empty());
    }

    #[test]
    fn practice_set_keeps_incorrectly_practiced() {
        let mut profile = LearnerProfile::default();
        profile.upsert_miss(miss(1, 0, 10));
        profile.upsert_miss(miss(1, 1, 20));
        profile.upsert_miss(miss(1, 2, 30));

        profile.mark_practiced(1, 0, false, at(40));
        profile.mark_practiced(1, 1, true, at(41));

        let keys: Vec<_> = profile.practice_set(10).iter().map(|m| m.key()).collect();
        assert_eq!(keys, vec![(1, 2), (1, 0)]);
        assert_eq!(profile.pending_practice_count(), 2);
    }

    #[test]
    fn mark_practiced_unknown_is_noop() {
        let mut profile = LearnerProfile::default();
        profile.upsert_miss(miss(1, 0, 0));
        let before = profile.clone();

        assert!(!profile.mark_practiced(9, 9, true, at(1)));
        assert_eq!(profile, before);
    }
}
