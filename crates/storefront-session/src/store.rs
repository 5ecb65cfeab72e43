//! Persistent key-value token storage
//!
//! The web front-end kept its token pair in browser local storage under two
//! fixed keys; this module is that contract as a trait. Access is
//! synchronous with last-writer-wins semantics, and the file-backed
//! implementation persists every mutation with an atomic temp-file + rename
//! so a crash mid-write never corrupts the token file.
//!
//! The store holds raw strings only. What the keys mean (access vs refresh
//! token) is the session's business, see [`crate::session::Session`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Synchronous key-value storage for session tokens.
///
/// Implementations are injected into [`crate::session::Session`]; tests use
/// [`MemoryTokenStore`], deployments use [`FileTokenStore`].
pub trait TokenStore: Send + Sync {
    /// Read the value under `key`, if present.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`, reporting whether it was present.
    fn remove(&self, key: &str) -> Result<bool>;
}

/// Token store persisted as a JSON object in a single file.
///
/// The Mutex serializes all access; mutations write through to disk before
/// releasing the lock, so readers never observe a state the file does not
/// (eventually) reflect.
pub struct FileTokenStore {
    path: PathBuf,
    state: Mutex<HashMap<String, String>>,
}

impl FileTokenStore {
    /// Open the store at the given file path.
    ///
    /// If the file doesn't exist it is created as `{}` (no session yet).
    pub fn open(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::Io(format!("reading token file: {e}")))?;
            let entries: HashMap<String, String> = serde_json::from_str(&contents)
                .map_err(|e| Error::Parse(format!("parsing token file: {e}")))?;
            info!(path = %path.display(), entries = entries.len(), "loaded token store");
            entries
        } else {
            info!(path = %path.display(), "token file not found, starting with empty store");
            let entries = HashMap::new();
            // Create the empty file so future opens don't need the cold-start path
            write_atomic(&path, &entries)?;
            entries
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let state = self.state.lock().map_err(|_| Error::Poisoned)?;
        Ok(state.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().map_err(|_| Error::Poisoned)?;
        state.insert(key.to_owned(), value.to_owned());
        debug!(key, "stored token");
        write_atomic(&self.path, &state)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut state = self.state.lock().map_err(|_| Error::Poisoned)?;
        let removed = state.remove(key).is_some();
        if removed {
            debug!(key, "removed token");
            write_atomic(&self.path, &state)?;
        }
        Ok(removed)
    }
}

/// In-memory token store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    state: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let state = self.state.lock().map_err(|_| Error::Poisoned)?;
        Ok(state.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().map_err(|_| Error::Poisoned)?;
        state.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut state = self.state.lock().map_err(|_| Error::Poisoned)?;
        Ok(state.remove(key).is_some())
    }
}

/// Write the token map to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. File permissions are set to 0600 (owner read/write only)
/// since the file contains live credentials.
fn write_atomic(path: &Path, entries: &HashMap<String, String>) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| Error::Parse(format!("serializing token file: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("token file path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".tokens.tmp.{}", std::process::id()));

    std::fs::write(&tmp_path, json.as_bytes())
        .map_err(|e| Error::Io(format!("writing temp token file: {e}")))?;

    // Set 0600 permissions (unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&tmp_path, perms)
            .map_err(|e| Error::Io(format!("setting token file permissions: {e}")))?;
    }

    std::fs::rename(&tmp_path, path)
        .map_err(|e| Error::Io(format!("renaming temp token file: {e}")))?;

    debug!(path = %path.display(), "persisted tokens");
    Ok(())
}
