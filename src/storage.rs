//! Local key-value storage and the bearer-token cell built on it.
//!
//! DESIGN
//! ======
//! The token is the only persisted client state. `TokenStore` wraps an
//! injected `KeyValueStore` so tests can use `MemoryStore` while the binary
//! uses `FileStore`. Reads are advisory: a storage failure reads as "no
//! token" and is logged rather than propagated.
//!
//! WRITERS
//! =======
//! Only session init, login, logout, and the 401 response middleware write
//! the token. A write racing a read costs at most one extra request that
//! comes back 401 and re-runs the (idempotent) clear path.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::error::ClientError;

/// Well-known key holding the raw bearer token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Minimal string key-value store, the native stand-in for browser local storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;

    /// Remove a value. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), ClientError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON object on disk, re-read on every access so separate processes
/// (successive CLI invocations) share one session.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, ClientError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(storage_err(&self.path, &e)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| storage_err(&self.path, &e))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| storage_err(parent, &e))?;
            }
        }
        let json = serde_json::to_string_pretty(entries).map_err(|e| storage_err(&self.path, &e))?;
        std::fs::write(&self.path, json).map_err(|e| storage_err(&self.path, &e))
    }
}

fn storage_err(path: &Path, err: &dyn std::fmt::Display) -> ClientError {
    ClientError::Storage(format!("{}: {err}", path.display()))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

// =============================================================================
// TOKEN STORE
// =============================================================================

/// The process-wide bearer-token cell.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current token. Empty strings and unreadable storage count as absent.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        match self.store.get(ACCESS_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "token read failed; treating as anonymous");
                None
            }
        }
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.get().is_some()
    }

    /// Persist a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the token cannot be written.
    pub fn set(&self, token: &str) -> Result<(), ClientError> {
        self.store.set(ACCESS_TOKEN_KEY, token)
    }

    /// Drop the token. Idempotent; failures are logged.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(ACCESS_TOKEN_KEY) {
            warn!(error = %e, "token clear failed");
        }
    }

    /// Put back a previously observed token state.
    pub(crate) fn restore(&self, previous: Option<&str>) {
        match previous {
            Some(token) => {
                if let Err(e) = self.set(token) {
                    warn!(error = %e, "token restore failed");
                }
            }
            None => self.clear(),
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").field("has_token", &self.has_token()).finish()
    }
}
