//! File-backed implementation of the `KeyValueStore` trait.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use daykart_core::error::DomainError;
use daykart_core::storage::KeyValueStore;

/// Key/value store persisted as one JSON object on disk.
///
/// The whole map is held in memory; every `set`/`remove` rewrites the file
/// through a temporary sibling and an atomic rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, creating it lazily on first write.
    ///
    /// A file that exists but does not hold a JSON object of strings is
    /// logged and treated as empty; it is overwritten on the next write.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "corrupt store file, starting empty");
                HashMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(DomainError::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened file store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), DomainError> {
        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                DomainError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        fs::write(&tmp, raw)
            .map_err(|e| DomainError::Storage(format!("failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            DomainError::Storage(format!("failed to replace {}: {e}", self.path.display()))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| DomainError::Storage("lock poisoned".to_owned()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| DomainError::Storage("lock poisoned".to_owned()))?;
        let previous = entries.insert(key.to_owned(), value);
        if let Err(e) = self.flush(&entries) {
            // Keep memory and disk in step when the write fails.
            match previous {
                Some(old) => entries.insert(key.to_owned(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| DomainError::Storage("lock poisoned".to_owned()))?;
        if let Some(old) = entries.remove(key) {
            if let Err(e) = self.flush(&entries) {
                entries.insert(key.to_owned(), old);
                return Err(e);
            }
        }
        Ok(())
    }
}
