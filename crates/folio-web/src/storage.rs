#![forbid(unsafe_code)]

//! Theme-preference persistence backends.
//!
//! In a browser the host applies [`DomCommand::PersistPreference`] to
//! `localStorage` itself; these backends cover everything else: native
//! embeddings, the session recorder, and tests.
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: storage failures never panic; operations
//!    return `Result`.
//! 2. **Atomic writes**: file storage uses the write-rename pattern to
//!    prevent corruption.
//! 3. **Absent is fine**: a missing key or missing file loads as `None`.
//!
//! # Feature Gates
//!
//! - `state-persistence`: enables [`FileStorage`] with JSON serialization.
//!   Without this feature, only [`MemoryStorage`] is available.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use folio_core::command::DomCommand;

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    #[cfg(feature = "state-persistence")]
    Serialization(String),
    /// Storage is corrupted or otherwise unusable.
    Corruption(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "state-persistence")]
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            #[cfg(feature = "state-persistence")]
            StorageError::Serialization(_) => None,
            StorageError::Corruption(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for pluggable preference storage backends.
///
/// Implementations must be thread-safe (`Send + Sync`); the engine itself is
/// single-threaded but embeddings may not be.
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Load a stored value. Returns `Ok(None)` when the key is absent.
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store a value under `key`, replacing any previous value.
    fn store(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove all stored values.
    fn clear(&self) -> StorageResult<()>;
}

/// Apply the `PersistPreference` commands in a batch to a backend.
///
/// This is the host-side glue a native embedding uses in place of the
/// browser's `localStorage`: feed every presented batch through it and the
/// backend stays in sync with the engine's preference writes.
pub fn apply_persist_commands(
    backend: &dyn StorageBackend,
    commands: &[DomCommand],
) -> StorageResult<()> {
    for command in commands {
        if let DomCommand::PersistPreference { key, value } = command {
            tracing::debug!(backend = backend.name(), %key, %value, "preference persisted");
            backend.store(key, value)?;
        }
    }
    Ok(())
}

/// In-memory storage backend for testing and ephemeral embeddings.
///
/// State is lost when the process exits.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create memory storage pre-populated with entries.
    #[must_use]
    pub fn with_entries(entries: HashMap<String, String>) -> Self {
        Self {
            data: RwLock::new(entries),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.clear();
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.data.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStorage")
            .field("entries", &count)
            .finish()
    }
}

#[cfg(feature = "state-persistence")]
mod file_storage {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Schema version for the preference file.
    const STATE_FILE_VERSION: u32 = 1;

    /// File format for stored preferences (JSON).
    #[derive(Serialize, Deserialize)]
    struct StateFile {
        version: u32,
        entries: HashMap<String, String>,
    }

    /// JSON-file storage backend.
    ///
    /// Writes go to a sibling temp file first and are renamed into place, so
    /// a crash mid-write never corrupts the previous state.
    #[derive(Debug)]
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// Create a backend persisting to `path`.
        #[must_use]
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// The file this backend persists to.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn load_entries(&self) -> StorageResult<HashMap<String, String>> {
            if !self.path.exists() {
                return Ok(HashMap::new());
            }
            let bytes = fs::read(&self.path)?;
            let file: StateFile = serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            Ok(file.entries)
        }

        fn save_entries(&self, entries: &HashMap<String, String>) -> StorageResult<()> {
            let file = StateFile {
                version: STATE_FILE_VERSION,
                entries: entries.clone(),
            };
            let bytes = serde_json::to_vec_pretty(&file)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;

            let mut tmp = self.path.clone();
            tmp.set_extension("tmp");
            fs::write(&tmp, bytes)?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        }
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn load(&self, key: &str) -> StorageResult<Option<String>> {
            Ok(self.load_entries()?.remove(key))
        }

        fn store(&self, key: &str, value: &str) -> StorageResult<()> {
            let mut entries = self.load_entries()?;
            entries.insert(key.to_owned(), value.to_owned());
            self.save_entries(&entries)
        }

        fn clear(&self) -> StorageResult<()> {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            Ok(())
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use file_storage::FileStorage;
