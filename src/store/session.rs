//! Session store — single source of truth for "is there a valid admin
//! session".
//!
//! DESIGN
//! ======
//! A context-passed container constructed once at process start. State is
//! mutated only inside the four operations here; screens read settled
//! snapshots. A durable cache makes the last settled snapshot survive a
//! reload, but it is a hint only — `check_session` is the sole authority
//! for restoring a session.
//!
//! ERROR HANDLING
//! ==============
//! No operation returns an error. Every remote failure is caught and
//! converted into the `error` field of the settled snapshot, so the UI
//! layer never sees an unhandled failure and stays interactive.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::backend::AuthBackend;
use crate::model::AdminUser;
use crate::persist::SessionCache;

/// Error message for a valid account that is not on the admin allow-list.
pub const NOT_AUTHORIZED_MESSAGE: &str = "This account is not authorized for the admin area";
const MISSING_CREDENTIALS_MESSAGE: &str = "Email and password are required";
const MISSING_PASSWORD_MESSAGE: &str = "Password is required";

// =============================================================================
// STATE
// =============================================================================

/// Observable session state. Serialized as-is by the durable cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub user: Option<AdminUser>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Lifecycle phase derived from [`SessionState`]. `Error` is a sub-state
/// of unauthenticated that carries a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Error,
}

impl SessionState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Authenticating
        } else if self.is_authenticated {
            SessionPhase::Authenticated
        } else if self.error.is_some() {
            SessionPhase::Error
        } else {
            SessionPhase::Unauthenticated
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore {
    backend: Arc<dyn AuthBackend>,
    cache: Option<SessionCache>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Build the store. A cached snapshot, if present, seeds the initial
    /// state so a reload renders plausibly, but `is_loading` is forced off
    /// and nothing is trusted until [`Self::check_session`] settles.
    #[must_use]
    pub fn new(backend: Arc<dyn AuthBackend>, cache: Option<SessionCache>) -> Self {
        let mut initial = cache.as_ref().and_then(SessionCache::load).unwrap_or_default();
        initial.is_loading = false;
        Self { backend, cache, state: RwLock::new(initial) }
    }

    /// Current state. Cheap clone; safe to call from any screen.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Authenticate with email/password and verify the identity against
    /// the admin allow-list. All outcomes are communicated through the
    /// returned settled snapshot; this never fails out.
    pub async fn login(&self, email: &str, password: &str) -> SessionState {
        if email.trim().is_empty() || password.is_empty() {
            return self.settle_failure(MISSING_CREDENTIALS_MESSAGE.to_owned());
        }
        self.begin();

        let user = match self.backend.sign_in(email, password).await {
            Ok(user) => user,
            Err(e) => return self.settle_failure(e.to_string()),
        };

        match self.backend.is_admin(&user.email).await {
            Ok(true) => {
                info!(user_id = %user.id, "admin signed in");
                self.settle_authenticated(user)
            }
            Ok(false) => {
                // A live remote session now exists for a non-admin; drop it
                // before reporting failure.
                if let Err(e) = self.backend.sign_out().await {
                    warn!(error = %e, "sign-out after rejected authorization failed");
                }
                self.settle_failure(NOT_AUTHORIZED_MESSAGE.to_owned())
            }
            Err(e) => {
                if let Err(e) = self.backend.sign_out().await {
                    warn!(error = %e, "sign-out after failed allow-list check failed");
                }
                self.settle_failure(e.to_string())
            }
        }
    }

    /// Sign out remotely (best effort) and clear the local session
    /// unconditionally. A failed remote call is logged, never surfaced as
    /// blocking.
    pub async fn logout(&self) -> SessionState {
        self.begin();
        if let Err(e) = self.backend.sign_out().await {
            warn!(error = %e, "remote sign-out failed; clearing local session anyway");
        }
        self.settle(SessionState::default())
    }

    /// Re-validate the session against the remote service. Called on app
    /// start and on every protected-route mount; the only path by which a
    /// persisted snapshot becomes trusted.
    pub async fn check_session(&self) -> SessionState {
        self.begin();

        let session = match self.backend.current_session().await {
            Ok(session) => session,
            Err(e) => return self.settle_failure(e.to_string()),
        };

        let Some(user) = session else {
            return self.settle(SessionState::default());
        };

        match self.backend.is_admin(&user.email).await {
            Ok(true) => self.settle_authenticated(user),
            Ok(false) => self.settle(SessionState::default()),
            Err(e) => self.settle_failure(e.to_string()),
        }
    }

    /// Change the current user's password. Loading/error discipline as for
    /// the other operations, but failure leaves the identity untouched.
    pub async fn update_password(&self, new_password: &str) -> SessionState {
        if new_password.is_empty() {
            return self.settle_with(|state| {
                state.error = Some(MISSING_PASSWORD_MESSAGE.to_owned());
            });
        }
        self.begin();

        match self.backend.update_password(new_password).await {
            Ok(()) => {
                info!("password updated");
                self.settle_with(|state| state.error = None)
            }
            Err(e) => self.settle_with(|state| state.error = Some(e.to_string())),
        }
    }

    // -------------------------------------------------------------------------
    // State transitions. Locks are never held across an await.
    // -------------------------------------------------------------------------

    fn begin(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.is_loading = true;
        state.error = None;
    }

    fn settle(&self, next: SessionState) -> SessionState {
        let settled = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = next;
            state.clone()
        };
        if let Some(cache) = &self.cache {
            cache.save(&settled);
        }
        settled
    }

    /// Settle by mutating the current state in place (identity preserved).
    fn settle_with(&self, apply: impl FnOnce(&mut SessionState)) -> SessionState {
        let settled = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.is_loading = false;
            apply(&mut state);
            state.clone()
        };
        if let Some(cache) = &self.cache {
            cache.save(&settled);
        }
        settled
    }

    fn settle_authenticated(&self, user: AdminUser) -> SessionState {
        self.settle(SessionState {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
            error: None,
        })
    }

    fn settle_failure(&self, message: String) -> SessionState {
        self.settle(SessionState {
            user: None,
            is_authenticated: false,
            is_loading: false,
            error: Some(message),
        })
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
