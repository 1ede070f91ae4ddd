//! learnquest-storage — Storage backends and configuration.
//!
//! Provides the JSON-file backend that keeps progress on disk between runs,
//! plus the `learnquest.toml` configuration that selects it.

use std::sync::Arc;

use learnquest_core::traits::StorageBackend;
use learnquest_core::{MemoryBackend, ProgressStore};

pub mod config;
pub mod file;

pub use config::{load_config, BackendKind, LearnquestConfig, StorageConfig};
pub use file::JsonFileBackend;

/// Create the backend described by `config`.
pub fn open_backend(config: &StorageConfig) -> Arc<dyn StorageBackend> {
    match config.backend {
        BackendKind::File => {
            tracing::debug!("using file storage at {}", config.path.display());
            Arc::new(JsonFileBackend::new(&config.path))
        }
        BackendKind::Memory => {
            tracing::debug!("using in-memory storage");
            Arc::new(MemoryBackend::new())
        }
    }
}

/// Open a progress store over the configured backend and key.
pub fn open_store(config: &StorageConfig) -> ProgressStore {
    ProgressStore::new(open_backend(config), config.key.clone())
}
