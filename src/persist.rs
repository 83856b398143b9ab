//! Forest persistence - 树数据持久化
//!
//! The store talks to one logical key per feature through the
//! [`ForestStore`] port: read the whole serialized forest, or overwrite
//! it completely. There is no partial/incremental persistence.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::error::TreeResult;

/// Persistence port. One logical key per feature (department tree,
/// dictionary-category tree, ...); keys are never shared.
pub trait ForestStore {
    /// Returns the serialized forest, or `None` when the key was never
    /// written. Read errors are treated as "absent" by callers.
    fn read_forest(&self, key: &str) -> Option<String>;

    /// Full overwrite of the key's forest
    fn write_forest(&self, key: &str, json: &str) -> TreeResult<()>;
}

/// In-memory key-value store, the browser-localStorage stand-in.
///
/// Clones share the same underlying map, so several components reading
/// the same key observe each other's writes, just like two widgets over
/// one localStorage.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate one key, mainly for tests
    pub fn with_forest(key: impl Into<String>, json: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), json.into());
        store
    }
}

impl ForestStore for MemoryStore {
    fn read_forest(&self, key: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write_forest(&self, key: &str, json: &str) -> TreeResult<()> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), json.to_string());
        Ok(())
    }
}

/// One JSON file per key under a data directory.
///
/// Writes go to a temp file first and are renamed into place, so an
/// interrupted write never leaves a half-written forest behind.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl ForestStore for JsonFileStore {
    fn read_forest(&self, key: &str) -> Option<String> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(json) => Some(json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write_forest(&self, key: &str, json: &str) -> TreeResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
