use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tracing::debug;

use crate::store::error::StoreError;

/// Flat string-keyed map of JSON values shared by the page agent and the panel.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
    /// All bindings, ordered by key.
    fn entries(&self) -> Result<Vec<(String, Value)>, StoreError>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex.lock().map_err(|_| StoreError::Poisoned)
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(lock(&self.values)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        lock(&self.values)?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.values)?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        lock(&self.values)?.clear();
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, Value)>, StoreError> {
        Ok(lock(&self.values)?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// Store persisted as one JSON object file, rewritten on every mutation.
///
/// A missing file is an empty store; the file is created on first write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: path.display().to_string(),
                source: e,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };

        debug!(path = %path.display(), keys = values.len(), "opened store");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(values).map_err(|e| StoreError::Encode {
            key: "<store>".into(),
            source: e,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        std::fs::write(&self.path, json).map_err(|e| StoreError::Io {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}

impl Store for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(lock(&self.values)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut values = lock(&self.values)?;
        values.insert(key.to_string(), value);
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = lock(&self.values)?;
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut values = lock(&self.values)?;
        values.clear();
        self.flush(&values)
    }

    fn entries(&self) -> Result<Vec<(String, Value)>, StoreError> {
        Ok(lock(&self.values)?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
