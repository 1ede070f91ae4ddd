//! learnquest-core — Progress store, attempt log, mastery analysis and rewards.
//!
//! This crate defines the learner data model, the storage and clock traits,
//! and the tracker that every front end drives.

pub mod attempts;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod mastery;
pub mod model;
pub mod quiz;
pub mod rewards;
pub mod store;
pub mod summary;
pub mod traits;

pub use engine::Tracker;
pub use error::{StorageError, TrackerError};
pub use store::{MemoryBackend, ProgressStore, DEFAULT_STORAGE_KEY};
