// ── Persisted preferences ──
//
// Small key-value store for per-user view settings such as
// `{user_id}:show_all_servers`. Reads come from an in-memory map loaded
// once; writes update the map and, for file-backed stores, rewrite the
// JSON file before returning.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::CoreError;

/// Key-value preference store.
#[derive(Debug)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: Mutex<Map<String, Value>>,
}

impl PreferenceStore {
    /// Store that forgets everything on exit.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Mutex::new(Map::new()),
        }
    }

    /// Open a JSON-file-backed store. A missing file starts empty; an
    /// unreadable or malformed one is logged and replaced on next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring malformed preferences file");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read preferences file");
                Map::new()
            }
        };
        debug!(path = %path.display(), keys = values.len(), "preferences loaded");
        Self {
            path: Some(path),
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read `key`, falling back to `default` when it is absent or holds a
    /// value of the wrong shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(default)
    }

    /// Write `key`. Visible to `get` immediately.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CoreError> {
        let value = serde_json::to_value(value).map_err(|e| CoreError::Preferences {
            message: format!("cannot encode {key}: {e}"),
        })?;
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = values.clone();
        next.insert(key.to_owned(), value);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), CoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<(), CoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::Preferences {
                message: format!("cannot create {}: {e}", parent.display()),
            })?;
        }
        let raw = serde_json::to_string_pretty(values).map_err(|e| CoreError::Preferences {
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| CoreError::Preferences {
            message: format!("cannot write {}: {e}", path.display()),
        })
    }
}
