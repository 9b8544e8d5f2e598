//! Persisted key/value state.
//!
//! The rate gate only needs to read and write one opaque string under one
//! key. [`StateStore`] is that capability; [`FileStore`] keeps each key in
//! a file on disk, [`MemoryStore`] keeps them in memory.
//!
//! Writes replace the whole value. There is no locking: two processes can
//! both read before either writes.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::DEFAULT_STATE_DIR;
use crate::error::StoreResult;

/// Get/set of opaque string values.
pub trait StateStore {
    /// Read a value; `None` when nothing was stored.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace a value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

impl<S: StateStore + ?Sized> StateStore for &S {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }
}

/// One file per key under a state directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store under the default state directory
    pub fn new() -> Self {
        Self::with_dir(DEFAULT_STATE_DIR)
    }

    /// Store under a custom directory
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a key; anything outside `[A-Za-z0-9_-]` becomes `-`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let slug: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
            .collect();
        self.dir.join(format!("{}.json", slug))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        // Ensure directory exists
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
