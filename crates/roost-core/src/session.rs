//! Session persistence and the authentication predicate.
//!
//! The client's whole authentication signal is one persisted value: the
//! session token stored under [`SESSION_KEY`]. The predicate is a plain
//! synchronous read so the navigation guard can run it on every transition
//! without suspending.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::debug;

/// Well-known key the session token is persisted under.
pub const SESSION_KEY: &str = "user";

/// Storage backend for persisted session values.
///
/// Reads must be cheap and side-effect free; they run on every navigation.
pub trait SessionBackend: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Delete a value
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory backend, used in tests and embedded callers.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        let values = self
            .values
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// File-backed backend: a flat JSON object on disk, loaded once and written
/// through on every change.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileBackend {
    /// Open (or create) the session file at the given path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            HashMap::new()
        };
        debug!(path = %path.display(), entries = values.len(), "opened session file");
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Default location: `<data_dir>/roost/session.json`
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().or_else(dirs::home_dir).ok_or_else(|| {
            Error::Session("cannot determine data directory".to_string())
        })?;
        Ok(data_dir.join("roost").join("session.json"))
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = std::fs::Permissions::from_mode(0o700);
                let _ = std::fs::set_permissions(parent, perms);
            }
        }

        let json = serde_json::to_vec_pretty(values)?;
        std::fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&self.path, perms);
        }

        Ok(())
    }
}

impl SessionBackend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        let values = self
            .values
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.remove(key);
        self.persist(&values)
    }
}

/// Persisted session state and the authentication predicate.
pub struct SessionStore {
    backend: Box<dyn SessionBackend>,
}

impl SessionStore {
    /// Create a store over the given backend
    #[must_use]
    pub fn new(backend: impl SessionBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Create a store with an in-memory backend
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// The authentication predicate: true iff a non-empty session value is
    /// persisted. Safe to call on every navigation.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.backend
            .get(SESSION_KEY)
            .is_some_and(|value| !value.is_empty())
    }

    /// Current session token, if a non-empty one is persisted.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.backend
            .get(SESSION_KEY)
            .filter(|value| !value.is_empty())
    }

    /// Persist a session token
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.backend.set(SESSION_KEY, token)
    }

    /// Invalidate the session
    pub fn clear(&self) -> Result<()> {
        self.backend.remove(SESSION_KEY)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
