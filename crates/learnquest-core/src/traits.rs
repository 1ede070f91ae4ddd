//! Collaborator traits for storage, time and notifications.
//!
//! The tracker never reaches for ambient globals: the storage backend, the
//! clock and the notification sink are all handed to it at construction.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

use crate::catalog::Achievement;
use crate::error::StorageError;
use crate::model::StreakState;

// ---------------------------------------------------------------------------
// Storage backend trait
// ---------------------------------------------------------------------------

/// A string key-value store, shaped after browser local storage.
///
/// Methods take `&self`; implementations use interior mutability so one
/// backend can be shared by several stores.
pub trait StorageBackend: Send + Sync {
    /// Human-readable backend name (e.g. "memory").
    fn name(&self) -> &str;

    /// Fetch the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// Clock trait
// ---------------------------------------------------------------------------

/// Source of timestamps and of the learner's calendar date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The calendar day used for streak accounting.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock; streak days follow the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A manually driven clock for deterministic tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// A clock parked at noon UTC on the given date.
    pub fn on_date(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        Self::new(noon.and_utc())
    }

    /// Move the clock to an absolute instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Move the clock forward (or back, for negative values) by whole days.
    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += Duration::days(days);
    }

    /// Move the clock forward by seconds.
    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += Duration::seconds(secs);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Notification trait
// ---------------------------------------------------------------------------

/// Receives reward events so a front end can celebrate them.
pub trait RewardNotifier: Send + Sync {
    fn on_xp_changed(&self, identity: &str, delta: i64, total: u32);
    fn on_achievement_unlocked(&self, identity: &str, achievement: &Achievement);
    fn on_level_completed(&self, identity: &str, level_id: u32, streak: &StreakState);
}

/// No-op notifier.
pub struct NoopNotifier;

impl RewardNotifier for NoopNotifier {
    fn on_xp_changed(&self, _: &str, _: i64, _: u32) {}
    fn on_achievement_unlocked(&self, _: &str, _: &Achievement) {}
    fn on_level_completed(&self, _: &str, _: u32, _: &StreakState) {}
}
