//! Error types for the progress tracker.
//!
//! `StorageError` is what a [`StorageBackend`](crate::traits::StorageBackend)
//! reports. It lives here rather than in `learnquest-storage` so the store can
//! tell a recoverable corrupt image apart from a hard I/O failure.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The backing file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The backing image exists but does not parse.
    #[error("storage image {} is corrupt: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    /// A thread panicked while holding the backend lock.
    #[error("storage backend lock poisoned")]
    Poisoned,
}

impl StorageError {
    /// Returns `true` if the stored data is unreadable but the backend itself
    /// is healthy, so a fresh write may replace it.
    pub fn is_corruption(&self) -> bool {
        matches!(self, StorageError::Corrupt { .. })
    }
}

/// Errors returned by tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The backend failed to persist.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A profile could not be serialized.
    #[error("failed to encode progress: {0}")]
    Encode(#[from] serde_json::Error),

    /// The curriculum has no level with this id.
    #[error("unknown level: {0}")]
    UnknownLevel(u32),

    /// The level has no quiz to submit.
    #[error("level {0} has no quiz questions")]
    EmptyQuiz(u32),

    /// The answer sheet does not line up with the quiz.
    #[error("level {level_id} has {expected} quiz questions, got {actual} answers")]
    AnswerCount {
        level_id: u32,
        expected: usize,
        actual: usize,
    },

    /// The quiz score is too low to complete the level from the quiz.
    #[error("a score of {score}% on level {level_id} is below the required {required}%")]
    ScoreTooLow {
        level_id: u32,
        score: u32,
        required: u32,
    },
}
