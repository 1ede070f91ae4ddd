//! Progress store: one JSON object mapping identity to profile, kept under a
//! single storage key.
//!
//! Reads never fail. An absent key, an unreadable backend or a corrupt blob
//! all read back as empty profiles; the next successful write replaces the
//! damaged data. Inside a profile each field decodes on its own, and list
//! entries that do not decode are dropped one by one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{StorageError, TrackerError};
use crate::model::{LearnerProfile, ProfileUpdate};
use crate::traits::StorageBackend;

/// Storage key used by the browser build.
pub const DEFAULT_STORAGE_KEY: &str = "csharpGamifiedLearning";

/// Persistence for learner profiles, scoped by identity.
pub struct ProgressStore {
    backend: Arc<dyn StorageBackend>,
    storage_key: String,
}

impl ProgressStore {
    pub fn new(backend: Arc<dyn StorageBackend>, storage_key: impl Into<String>) -> Self {
        Self {
            backend,
            storage_key: storage_key.into(),
        }
    }

    /// A store over `backend` using [`DEFAULT_STORAGE_KEY`].
    pub fn with_default_key(backend: Arc<dyn StorageBackend>) -> Self {
        Self::new(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Return the stored profile, or defaults if there is none.
    pub fn read(&self, identity: &str) -> LearnerProfile {
        let map = self.load_map();
        decode_profile(identity, map.get(identity))
    }

    /// Merge `update` into the stored profile and persist it.
    pub fn write(
        &self,
        identity: &str,
        update: ProfileUpdate,
    ) -> Result<LearnerProfile, TrackerError> {
        self.update(identity, |profile| {
            update.apply(profile);
            profile.clone()
        })
    }

    /// Remove the identity's profile. Returns `false` if there was none.
    pub fn erase(&self, identity: &str) -> Result<bool, TrackerError> {
        let mut map = self.load_map();
        if map.remove(identity).is_none() {
            return Ok(false);
        }
        self.save_map(map)?;
        tracing::info!("erased progress for '{identity}'");
        Ok(true)
    }

    /// All identities with a stored profile, sorted.
    pub fn identities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.load_map().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Read-modify-write one profile.
    ///
    /// The closure's return value is passed back once the profile has been
    /// persisted. Nothing is written if serialization fails.
    pub fn update<T>(
        &self,
        identity: &str,
        f: impl FnOnce(&mut LearnerProfile) -> T,
    ) -> Result<T, TrackerError> {
        let mut map = self.load_map();
        let mut profile = decode_profile(identity, map.get(identity));
        let out = f(&mut profile);
        map.insert(identity.to_string(), serde_json::to_value(&profile)?);
        self.save_map(map)?;
        Ok(out)
    }

    fn load_map(&self) -> Map<String, Value> {
        let raw = match self.backend.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Map::new(),
            Err(e) => {
                tracing::warn!(
                    "{} backend unreadable, using empty progress: {e}",
                    self.backend.name()
                );
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                tracing::warn!(
                    "progress under '{}' is not an object ({}), ignoring it",
                    self.storage_key,
                    json_kind(&other)
                );
                Map::new()
            }
            Err(e) => {
                tracing::warn!(
                    "progress under '{}' is corrupt, ignoring it: {e}",
                    self.storage_key
                );
                Map::new()
            }
        }
    }

    fn save_map(&self, map: Map<String, Value>) -> Result<(), TrackerError> {
        let json = serde_json::to_string(&Value::Object(map))?;
        self.backend.set(&self.storage_key, &json)?;
        Ok(())
    }
}

fn decode_profile(identity: &str, value: Option<&Value>) -> LearnerProfile {
    let mut profile = LearnerProfile::default();
    let Some(value) = value else {
        return profile;
    };
    let Value::Object(fields) = value else {
        tracing::warn!(
            "profile for '{identity}' is not an object ({}), starting fresh",
            json_kind(value)
        );
        return profile;
    };

    decode_field(identity, fields, "xp", &mut profile.xp);
    decode_field(identity, fields, "completedLevels", &mut profile.completed_levels);
    decode_field(
        identity,
        fields,
        "unlockedAchievements",
        &mut profile.unlocked_achievements,
    );
    decode_field(identity, fields, "streak", &mut profile.streak);
    decode_list(identity, fields, "attemptLog", &mut profile.attempt_log);
    decode_list(identity, fields, "missedQuestions", &mut profile.missed_questions);
    decode_field(identity, fields, "hintsUsed", &mut profile.hints_used);
    profile
}

/// Overwrite `slot` with the stored field if it decodes; keep the default otherwise.
fn decode_field<T: DeserializeOwned>(
    identity: &str,
    fields: &Map<String, Value>,
    key: &str,
    slot: &mut T,
) {
    let Some(value) = fields.get(key) else {
        return;
    };
    match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => *slot = decoded,
        Err(e) => tracing::warn!("profile for '{identity}': dropping corrupt '{key}': {e}"),
    }
}

/// Like [`decode_field`], but keeps every list entry that decodes.
fn decode_list<T: DeserializeOwned>(
    identity: &str,
    fields: &Map<String, Value>,
    key: &str,
    slot: &mut Vec<T>,
) {
    let Some(value) = fields.get(key) else {
        return;
    };
    let Value::Array(entries) = value else {
        tracing::warn!(
            "profile for '{identity}': '{key}' is not an array ({}), dropping it",
            json_kind(value)
        );
        return;
    };

    let mut dropped = 0usize;
    *slot = entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<T>(entry.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                dropped += 1;
                tracing::debug!("profile for '{identity}': bad '{key}' entry: {e}");
                None
            }
        })
        .collect();
    if dropped > 0 {
        tracing::warn!("profile for '{identity}': dropped {dropped} corrupt '{key}' entries");
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// A process-local backend. Share it behind an `Arc` to simulate a page
/// reload: a second store over the same backend sees everything the first
/// one wrote.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend pre-seeded with one raw entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.to_string());
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
