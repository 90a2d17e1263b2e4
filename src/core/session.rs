//! # Session Persistence
//!
//! Remembers which backend conversation session to resume. Only the id is
//! stored; the conversation itself lives on the backend.
//!
//! Surfaces get a `SessionStore` injected so the storage mechanism stays out
//! of conversation logic. The file store writes `~/.tripmate/session.json`
//! with an atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, session_id: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// On-disk record for the file store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub session_id: String,
    pub saved_at: i64,
}

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at `~/.tripmate/session.json`.
    pub fn default_location() -> io::Result<Self> {
        let dir = crate::core::config::config_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?;
        Ok(Self::new(dir.join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<String> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read session file {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str::<SessionRecord>(&json) {
            Ok(record) => {
                debug!("Resuming session {}", record.session_id);
                Some(record.session_id)
            }
            Err(e) => {
                warn!("Ignoring corrupt session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, session_id: &str) -> io::Result<()> {
        let record = SessionRecord {
            session_id: session_id.to_string(),
            saved_at: Utc::now().timestamp(),
        };
        atomic_write_json(&self.path, &record)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Process-local store, for tests and for surfaces that must not persist.
#[derive(Default)]
pub struct MemorySessionStore {
    id: Mutex<Option<String>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<String> {
        self.id.lock().ok().and_then(|id| id.clone())
    }

    fn save(&self, session_id: &str) -> io::Result<()> {
        let mut id = self
            .id
            .lock()
            .map_err(|_| io::Error::other("session store poisoned"))?;
        *id = Some(session_id.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        let mut id = self
            .id
            .lock()
            .map_err(|_| io::Error::other("session store poisoned"))?;
        *id = None;
        Ok(())
    }
}

/// Generate a new UUID v4 session ID.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Returns the stored session id, or creates, saves and returns a new one.
pub fn resume_or_create(store: &dyn SessionStore) -> String {
    if let Some(id) = store.load() {
        return id;
    }
    let id = new_session_id();
    if let Err(e) = store.save(&id) {
        warn!("Failed to save new session id: {}", e);
    }
    id
}

/// Replaces whatever session is stored with `session_id`.
pub fn replace(store: &dyn SessionStore, session_id: &str) {
    if let Err(e) = store.clear() {
        warn!("Failed to clear stored session: {}", e);
    }
    if let Err(e) = store.save(session_id) {
        warn!("Failed to save session {}: {}", session_id, e);
    }
}
