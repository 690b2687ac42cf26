use std::sync::Arc;

use super::*;
use crate::backend::{AuthBackend, memory::MemoryBackend};

async fn guard_with_admin() -> (Arc<MemoryBackend>, Arc<SessionStore>, RouteGuard) {
    let backend = Arc::new(MemoryBackend::new());
    backend.seed_admin("admin@example.com", "s3cret").await;
    let session = Arc::new(SessionStore::new(backend.clone(), None));
    let guard = RouteGuard::new(session.clone());
    (backend, session, guard)
}

// =============================================================================
// is_admin_path
// =============================================================================

#[test]
fn admin_prefix_and_nested_paths_are_admin() {
    assert!(is_admin_path("/admin"));
    assert!(is_admin_path("/admin/properties"));
    assert!(is_admin_path("/admin/settings/password"));
}

#[test]
fn public_and_lookalike_paths_are_not_admin() {
    assert!(!is_admin_path("/"));
    assert!(!is_admin_path("/properties"));
    assert!(!is_admin_path("/administrator"));
}

// =============================================================================
// authorize
// =============================================================================

#[tokio::test]
async fn public_paths_are_always_allowed() {
    let (_, _, guard) = guard_with_admin().await;
    assert_eq!(guard.authorize("/").await, RouteDecision::Allow);
    assert_eq!(guard.authorize("/properties").await, RouteDecision::Allow);
    assert_eq!(guard.authorize("/contact").await, RouteDecision::Allow);
}

#[tokio::test]
async fn login_path_is_reachable_while_unauthenticated() {
    let (_, _, guard) = guard_with_admin().await;
    assert_eq!(guard.authorize(LOGIN_PATH).await, RouteDecision::Allow);
}

#[tokio::test]
async fn admin_path_redirects_when_unauthenticated() {
    let (_, _, guard) = guard_with_admin().await;
    assert_eq!(guard.authorize("/admin/properties").await, RouteDecision::RedirectToLogin);
}

#[tokio::test]
async fn admin_path_allowed_after_login() {
    let (_, session, guard) = guard_with_admin().await;
    session.login("admin@example.com", "s3cret").await;
    assert_eq!(guard.authorize("/admin/properties").await, RouteDecision::Allow);
}

#[tokio::test]
async fn guard_revalidates_on_every_mount() {
    let (backend, session, guard) = guard_with_admin().await;
    session.login("admin@example.com", "s3cret").await;
    assert_eq!(guard.authorize("/admin/dashboard").await, RouteDecision::Allow);

    // Session dies remotely; the local snapshot still says authenticated,
    // but the next mount must not trust it.
    backend.sign_out().await.unwrap();
    assert_eq!(guard.authorize("/admin/dashboard").await, RouteDecision::RedirectToLogin);
}
