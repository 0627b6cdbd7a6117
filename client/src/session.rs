//! Session persistence: the bearer token and user id that survive restarts.
//!
//! # Design
//! The store is a trait injected into the client and the services rather
//! than a process-wide singleton, so tests can run against an in-memory
//! implementation. Semantics are last-write-wins; a reader racing a `set`
//! may observe the previous session momentarily. `FileSessionStore` is the
//! durable variant: one small JSON document at a caller-chosen path, the
//! equivalent of the mobile platform's namespaced key-value store.

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// The authenticated user's bearer token and id, held until logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
}

/// Storage for the current session. No network access, last write wins.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<Session>;
    fn set(&self, session: Session);
    fn clear(&self);
}

/// In-memory store for tests and short-lived processes.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Session> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, session: Session) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    fn clear(&self) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// File-backed store: one JSON document at `path`.
///
/// Writes go through a sibling temp file and a rename, so readers never see
/// a torn document. A missing or corrupt file reads as "no session", which
/// also makes `clear` a plain file removal. Write failures are logged and
/// swallowed; losing a session is recoverable (the user logs in again).
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Session> {
        let raw = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    fn set(&self, session: Session) {
        let raw = match serde_json::to_string(&session) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("failed to encode session: {e}");
                return;
            }
        };
        let tmp = self.path.with_extension("tmp");
        if let Err(e) = fs::write(&tmp, raw).and_then(|()| fs::rename(&tmp, &self.path)) {
            log::warn!("failed to persist session to {}: {e}", self.path.display());
        }
    }

    fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("failed to clear session at {}: {e}", self.path.display());
            }
        }
    }
}
