//! Durable single-record storage used for the session and the cookie jar.
//!
//! DESIGN
//! ======
//! Each store owns exactly one record under a fixed key. Callers deal in raw
//! JSON strings; schema validation happens one layer up so a corrupt record
//! can be treated as "absent" instead of an error.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key under which the session record is persisted.
pub const SESSION_RECORD_KEY: &str = "quillpost_auth";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_owned(), source }
    }
}

/// One durable record. Implementations must be safe to share across tasks.
pub trait RecordStorage: Send + Sync {
    /// Read the record, `None` when nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the record.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be written.
    fn save(&self, raw: &str) -> Result<(), StorageError>;

    /// Delete the record. Removing an absent record succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be modified.
    fn remove(&self) -> Result<(), StorageError>;
}

impl<T: RecordStorage + ?Sized> RecordStorage for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<String>, StorageError> {
        (**self).load()
    }

    fn save(&self, raw: &str) -> Result<(), StorageError> {
        (**self).save(raw)
    }

    fn remove(&self) -> Result<(), StorageError> {
        (**self).remove()
    }
}

/// Record stored as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Session record inside `dir`.
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self::with_key(dir, SESSION_RECORD_KEY)
    }

    #[must_use]
    pub fn with_key(dir: &Path, key: &str) -> Self {
        Self { path: dir.join(format!("{key}.json")) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl RecordStorage for FileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&self.path, e)),
        }
    }

    fn save(&self, raw: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        // Write-then-rename so a crash never leaves a torn record behind.
        let staging = self.staging_path();
        std::fs::write(&staging, raw).map_err(|e| StorageError::io(&staging, e))?;
        std::fs::rename(&staging, &self.path).map_err(|e| StorageError::io(&self.path, e))
    }

    fn remove(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(&self.path, e)),
        }
    }
}

/// Process-local record, for tests and throwaway clients.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    record: Mutex<Option<String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(raw: &str) -> Self {
        Self { record: Mutex::new(Some(raw.to_owned())) }
    }

    /// Current raw record.
    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.record
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl RecordStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.snapshot())
    }

    fn save(&self, raw: &str) -> Result<(), StorageError> {
        *self
            .record
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(raw.to_owned());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self
            .record
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
