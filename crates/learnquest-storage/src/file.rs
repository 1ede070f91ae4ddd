//! JSON file backend.
//!
//! The file holds one JSON object mapping storage key to stored string, the
//! same shape as a browser's local-storage area. Every write replaces the
//! file atomically through a temp file in the same directory.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use learnquest_core::error::StorageError;
use learnquest_core::traits::StorageBackend;

type Image = BTreeMap<String, String>;

/// A [`StorageBackend`] persisted to a single JSON file.
pub struct JsonFileBackend {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_image(&self) -> Result<Image, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Image::new()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Image::new());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Load the image for modification; a corrupt image is discarded.
    fn load_for_write(&self) -> Result<Image, StorageError> {
        match self.load_image() {
            Ok(image) => Ok(image),
            Err(e) if e.is_corruption() => {
                tracing::warn!("discarding corrupt storage image: {e}");
                Ok(Image::new())
            }
            Err(e) => Err(e),
        }
    }

    fn save_image(&self, image: &Image) -> Result<(), StorageError> {
        let write_err = |source: std::io::Error| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_err)?;

        let json = serde_json::to_string_pretty(image)
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        tracing::debug!("wrote {} key(s) to {}", image.len(), self.path.display());
        Ok(())
    }
}

impl StorageBackend for JsonFileBackend {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.load_image()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut image = self.load_for_write()?;
        image.insert(key.to_string(), value.to_string());
        self.save_image(&image)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut image = self.load_for_write()?;
        if image.remove(key).is_some() {
            self.save_image(&image)?;
        }
        Ok(())
    }
}
