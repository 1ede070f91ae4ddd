//! Configuration loading.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use learnquest_core::rewards::RewardConfig;
use learnquest_core::DEFAULT_STORAGE_KEY;

/// Which storage backend to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON file on disk.
    #[default]
    File,
    /// Process memory; progress is lost on exit.
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::File => write!(f, "file"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" | "json" => Ok(BackendKind::File),
            "memory" | "mem" => Ok(BackendKind::Memory),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

/// Where progress is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Progress file for the file backend.
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Key all profiles are stored under.
    #[serde(default = "default_storage_key")]
    pub key: String,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./learnquest-data/progress.json")
}
fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: default_data_path(),
            key: default_storage_key(),
        }
    }
}

/// Where the curriculum and achievement files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_curriculum_path")]
    pub curriculum: PathBuf,
    #[serde(default = "default_achievements_path")]
    pub achievements: PathBuf,
}

fn default_curriculum_path() -> PathBuf {
    PathBuf::from("./data/levels.json")
}
fn default_achievements_path() -> PathBuf {
    PathBuf::from("./data/achievements.json")
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            curriculum: default_curriculum_path(),
            achievements: default_achievements_path(),
        }
    }
}

/// Top-level learnquest configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearnquestConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub rewards: RewardConfig,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
            from = start + value.len();
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `learnquest.toml` in the current directory
/// 2. `~/.config/learnquest/config.toml`
///
/// Environment variable overrides: `LEARNQUEST_DATA`, `LEARNQUEST_STORAGE_KEY`.
pub fn load_config() -> Result<LearnquestConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<LearnquestConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("learnquest.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<LearnquestConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => LearnquestConfig::default(),
    };

    // Apply env var overrides
    if let Ok(data) = std::env::var("LEARNQUEST_DATA") {
        config.storage.path = PathBuf::from(data);
    }
    if let Ok(key) = std::env::var("LEARNQUEST_STORAGE_KEY") {
        config.storage.key = key;
    }

    config.storage.path = resolve_path(&config.storage.path);
    config.content.curriculum = resolve_path(&config.content.curriculum);
    config.content.achievements = resolve_path(&config.content.achievements);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("learnquest"))
}
