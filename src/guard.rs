//! Route guard for the admin area.
//!
//! The router (external collaborator) asks the guard before rendering a
//! screen. Admin paths force a fresh `check_session` on every mount — the
//! persisted snapshot alone is never enough — and redirect to the login
//! path whenever the settled state is unauthenticated.

use std::sync::Arc;

use tracing::info;

use crate::store::session::SessionStore;

/// Path prefix of the protected admin area.
pub const ADMIN_PREFIX: &str = "/admin";
/// Login screen path; always reachable.
pub const LOGIN_PATH: &str = "/admin/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToLogin,
}

pub struct RouteGuard {
    session: Arc<SessionStore>,
}

/// True for `/admin` and everything nested under it.
#[must_use]
pub fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PREFIX
        || path
            .strip_prefix(ADMIN_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

impl RouteGuard {
    #[must_use]
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Decide whether the screen at `path` may render.
    pub async fn authorize(&self, path: &str) -> RouteDecision {
        if !is_admin_path(path) || path == LOGIN_PATH {
            return RouteDecision::Allow;
        }

        let settled = self.session.check_session().await;
        if settled.is_authenticated {
            RouteDecision::Allow
        } else {
            info!(path, "unauthenticated admin navigation; redirecting to login");
            RouteDecision::RedirectToLogin
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
