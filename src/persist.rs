//! Durable local caches for the session snapshot and the bearer token.
//!
//! [`SessionCache`] serializes the last settled [`SessionState`] under a
//! fixed storage key so a reload can show a plausible UI state instantly.
//! The snapshot is a hint only: `SessionStore::check_session` re-validates
//! against the remote service before it is trusted. [`TokenCache`] keeps
//! the bearer token the HTTP client needs for that re-validation, so a
//! session survives a process restart.
//!
//! ERROR HANDLING
//! ==============
//! All I/O here is best-effort. A missing, unreadable, or corrupt file
//! loads as `None`; failed writes are logged and swallowed.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::store::session::SessionState;

/// Fixed namespace for the persisted session snapshot.
pub const STORAGE_KEY: &str = "auth-storage";
/// Fixed namespace for the persisted bearer token.
pub const TOKEN_KEY: &str = "auth-token";

pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    /// Cache rooted in `dir`; the snapshot lives at `<dir>/auth-storage.json`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(format!("{STORAGE_KEY}.json")) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached snapshot, if one exists and parses.
    #[must_use]
    pub fn load(&self) -> Option<SessionState> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "discarding corrupt session cache");
                None
            }
        }
    }

    /// Write the snapshot, replacing any previous one.
    pub fn save(&self, state: &SessionState) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(error = %e, path = %parent.display(), "cannot create session cache directory");
                return;
            }
        }
        match serde_json::to_string_pretty(state) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    warn!(error = %e, path = %self.path.display(), "session cache write failed");
                }
            }
            Err(e) => warn!(error = %e, "session state serialization failed"),
        }
    }

    /// Remove the cached snapshot.
    pub fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, path = %self.path.display(), "session cache removal failed");
            }
        }
    }
}

/// Durable slot for the HTTP client's bearer token. Without it, every
/// restart loses the session and `check_session` has nothing to
/// re-validate.
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// Cache rooted in `dir`; the token lives at `<dir>/auth-token`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(TOKEN_KEY) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored token, if any. An empty file counts as no token.
    #[must_use]
    pub fn load(&self) -> Option<String> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        if token.is_empty() { None } else { Some(token.to_owned()) }
    }

    /// Write the token, replacing any previous one.
    pub fn save(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(error = %e, path = %parent.display(), "cannot create token cache directory");
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, token) {
            warn!(error = %e, path = %self.path.display(), "token cache write failed");
        }
    }

    /// Remove the stored token.
    pub fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, path = %self.path.display(), "token cache removal failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "persist_test.rs"]
mod tests;
