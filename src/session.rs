use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::ApiError;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "cms_token";
/// Storage key for the cached admin profile (JSON).
pub const ADMIN_KEY: &str = "cms_admin";

// ── Types ─────────────────────────────────────────────

/// The operator identity the server returns on login and from `/auth/me`.
/// Fields the client does not model are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

// ── Store trait ───────────────────────────────────────

/// Key/value persistence for the session. Implementations: `FileSessionStore`
/// (JSON file on disk) and, in tests, `MemorySessionStore`.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ApiError>;
    fn remove(&self, key: &str) -> Result<(), ApiError>;
}

/// Session persisted as a flat JSON object, one member per key. Writes go
/// through a temp file and a rename, so a crash never leaves half a map.
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

enum Loaded {
    Map(BTreeMap<String, String>),
    Corrupt(String),
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSessionStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Loaded, ApiError> {
        if !self.path.exists() {
            return Ok(Loaded::Map(BTreeMap::new()));
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            ApiError::Session(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        if raw.trim().is_empty() {
            return Ok(Loaded::Map(BTreeMap::new()));
        }
        Ok(match serde_json::from_str(&raw) {
            Ok(map) => Loaded::Map(map),
            Err(e) => Loaded::Corrupt(format!(
                "corrupt session file {}: {}",
                self.path.display(),
                e
            )),
        })
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, ApiError> {
        match self.load()? {
            Loaded::Map(map) => Ok(map),
            Loaded::Corrupt(msg) => Err(ApiError::Session(msg)),
        }
    }

    /// Map to modify. A corrupt file is discarded rather than blocking writes.
    fn writable_map(&self) -> Result<BTreeMap<String, String>, ApiError> {
        match self.load()? {
            Loaded::Map(map) => Ok(map),
            Loaded::Corrupt(msg) => {
                log::warn!("[session] {}; starting over", msg);
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), ApiError> {
        if map.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(|e| {
                    ApiError::Session(format!("cannot remove {}: {}", self.path.display(), e))
                })?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ApiError::Session(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }
        let body = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .map_err(|e| ApiError::Session(format!("cannot write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            ApiError::Session(format!("cannot replace {}: {}", self.path.display(), e))
        })
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.writable_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match self.load()? {
            Loaded::Map(mut map) => {
                if map.remove(key).is_some() {
                    self.write_map(&map)?;
                }
                Ok(())
            }
            Loaded::Corrupt(msg) => {
                log::warn!("[session] {}; removing it", msg);
                self.write_map(&BTreeMap::new())
            }
        }
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

#[cfg(test)]
impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }
}

#[cfg(test)]
impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        let map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
        Ok(())
    }
}

// ── Session context ───────────────────────────────────

/// The operator session, handed to the API client at construction. Token
/// presence means `Authenticated` until a verify call says otherwise; that
/// caller then drives the `invalidate()` transition.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Session { store }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Session::new(Arc::new(MemorySessionStore::new()))
    }

    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                log::warn!("[session] token unreadable: {}", e);
                None
            }
        }
    }

    /// Cached profile from the last login or profile update.
    pub fn admin(&self) -> Option<AdminProfile> {
        let raw = match self.store.get(ADMIN_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("[session] admin profile unreadable: {}", e);
                return None;
            }
        };
        serde_json::from_str(&raw)
            .map_err(|e| log::warn!("[session] cached admin profile is corrupt: {}", e))
            .ok()
    }

    pub fn state(&self) -> SessionState {
        if self.token().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    /// Storage-presence check only; says nothing about token validity.
    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    pub fn establish(&self, token: &str, admin: &AdminProfile) -> Result<(), ApiError> {
        if token.is_empty() {
            return Err(ApiError::Session("refusing to store an empty token".into()));
        }
        let admin_json = serde_json::to_string(admin)?;
        self.store.set(ADMIN_KEY, &admin_json)?;
        if let Err(e) = self.store.set(TOKEN_KEY, token) {
            let _ = self.store.remove(ADMIN_KEY);
            return Err(e);
        }
        log::info!("[session] signed in as {}", admin.username);
        Ok(())
    }

    pub fn refresh_admin(&self, admin: &AdminProfile) -> Result<(), ApiError> {
        let admin_json = serde_json::to_string(admin)?;
        self.store.set(ADMIN_KEY, &admin_json)
    }

    /// Drop both keys. Safe to call with no session present.
    pub fn invalidate(&self) -> Result<(), ApiError> {
        let token = self.store.remove(TOKEN_KEY);
        let admin = self.store.remove(ADMIN_KEY);
        log::info!("[session] cleared");
        token.and(admin)
    }
}
