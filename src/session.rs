// src/session.rs

use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use crate::error::ClientError;

const TOKEN_KEY: &str = "token";

/// Client-local persistence for the bearer token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, ClientError>;
    fn save(&self, token: &str) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// Ephemeral store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        let guard = self
            .token
            .read()
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        let mut guard = self
            .token
            .write()
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        *guard = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut guard = self
            .token
            .write()
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// JSON key-value file, the on-disk equivalent of browser local storage.
///
/// A missing file reads as "no token". Other keys in the file are preserved.
/// A corrupt file fails `load` but is overwritten by the next `save` or `clear`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, ClientError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Entries to base the next write on. An unparseable file is discarded
    /// so a fresh login can replace it; the flag reports that it was.
    fn entries_for_update(&self) -> Result<(BTreeMap<String, String>, bool), ClientError> {
        match self.read_entries() {
            Ok(entries) => Ok((entries, false)),
            Err(ClientError::Decode(e)) => {
                tracing::warn!(
                    "Discarding unreadable token file {}: {}",
                    self.path.display(),
                    e
                );
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    /// Writes a sibling temp file then renames it over the real one, so an
    /// interrupted write never leaves a truncated file behind.
    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = owner_only().open(&tmp_path)?;
        file.write_all(raw.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// The token is a credential: readable and writable by the owner only.
#[cfg(unix)]
fn owner_only() -> OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true).mode(0o600);
    options
}

#[cfg(not(unix))]
fn owner_only() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    options
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self.read_entries()?.remove(TOKEN_KEY))
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        let (mut entries, _) = self.entries_for_update()?;
        entries.insert(TOKEN_KEY.to_string(), token.to_owned());
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), ClientError> {
        let (mut entries, discarded) = self.entries_for_update()?;
        if entries.remove(TOKEN_KEY).is_some() || discarded {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// Explicit authentication context handed to the API client.
///
/// The token is read from the store on every call, so a `clear_token` takes
/// effect on the next request but never on one already in flight.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::default()))
    }

    pub fn token(&self) -> Option<String> {
        match self.store.load() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read session token: {}", e);
                None
            }
        }
    }

    pub fn set_token(&self, token: &str) -> Result<(), ClientError> {
        self.store.save(token)
    }

    pub fn clear_token(&self) -> Result<(), ClientError> {
        self.store.clear()
    }

    /// Presence of a token is the only authorization signal; it is never
    /// decoded or checked for expiry.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Guard for operations that need a signed-in user.
    pub fn require_token(&self) -> Result<String, ClientError> {
        self.token()
            .ok_or_else(|| ClientError::AuthError("Please log in to continue".to_string()))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
