use std::sync::Arc;

use super::*;
use crate::backend::memory::MemoryBackend;
use crate::persist::SessionCache;

async fn seeded() -> (Arc<MemoryBackend>, SessionStore) {
    let backend = Arc::new(MemoryBackend::new());
    backend.seed_admin("admin@example.com", "s3cret").await;
    let store = SessionStore::new(backend.clone(), None);
    (backend, store)
}

// =============================================================================
// Initial state / phases
// =============================================================================

#[test]
fn initial_state_is_unauthenticated() {
    let store = SessionStore::new(Arc::new(MemoryBackend::new()), None);
    let state = store.snapshot();
    assert!(state.user.is_none());
    assert!(!state.is_authenticated);
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert_eq!(state.phase(), SessionPhase::Unauthenticated);
}

#[test]
fn phase_loading_is_authenticating() {
    let state = SessionState { is_loading: true, ..SessionState::default() };
    assert_eq!(state.phase(), SessionPhase::Authenticating);
}

#[test]
fn phase_error_is_sub_state_of_unauthenticated() {
    let state = SessionState { error: Some("boom".into()), ..SessionState::default() };
    assert_eq!(state.phase(), SessionPhase::Error);
    assert!(!state.is_authenticated);
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_with_valid_credentials_authenticates() {
    let (_, store) = seeded().await;
    let settled = store.login("admin@example.com", "s3cret").await;

    assert!(settled.is_authenticated);
    assert!(!settled.is_loading);
    assert!(settled.error.is_none());
    assert_eq!(settled.user.unwrap().email, "admin@example.com");
    assert_eq!(store.snapshot().phase(), SessionPhase::Authenticated);
}

#[tokio::test]
async fn login_then_check_session_keeps_identity() {
    let (_, store) = seeded().await;
    let after_login = store.login("admin@example.com", "s3cret").await;
    let after_check = store.check_session().await;

    assert!(after_check.is_authenticated);
    assert_eq!(after_check.user.unwrap().id, after_login.user.unwrap().id);
}

#[tokio::test]
async fn login_with_bad_password_sets_error_and_clears_user() {
    let (_, store) = seeded().await;
    store.login("admin@example.com", "s3cret").await;

    let settled = store.login("admin@example.com", "wrong").await;
    assert!(!settled.is_authenticated);
    assert!(settled.user.is_none());
    assert!(!settled.error.unwrap().is_empty());
}

#[tokio::test]
async fn login_with_empty_fields_fails_without_remote_call() {
    let (backend, store) = seeded().await;

    let settled = store.login("", "s3cret").await;
    assert_eq!(settled.error.as_deref(), Some("Email and password are required"));

    let settled = store.login("admin@example.com", "").await;
    assert_eq!(settled.error.as_deref(), Some("Email and password are required"));
    assert!(backend.session().await.is_none());
}

#[tokio::test]
async fn login_rejects_account_outside_allow_list_and_invalidates_remote_session() {
    let (backend, store) = seeded().await;
    backend.seed_account("viewer@example.com", "s3cret").await;

    let settled = store.login("viewer@example.com", "s3cret").await;

    assert!(!settled.is_authenticated);
    assert_eq!(settled.error.as_deref(), Some(NOT_AUTHORIZED_MESSAGE));
    // The credentials were valid, so a remote session briefly existed; it
    // must be gone by the time login settles.
    assert!(backend.session().await.is_none());
}

#[tokio::test]
async fn login_network_failure_becomes_state_not_panic() {
    let (backend, store) = seeded().await;
    backend.set_fail_auth(true).await;

    let settled = store.login("admin@example.com", "s3cret").await;
    assert!(!settled.is_authenticated);
    assert!(settled.error.unwrap().contains("simulated outage"));
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_session() {
    let (_, store) = seeded().await;
    store.login("admin@example.com", "s3cret").await;

    let settled = store.logout().await;
    assert_eq!(settled, SessionState::default());
}

#[tokio::test]
async fn logout_clears_locally_even_if_remote_sign_out_fails() {
    let (backend, store) = seeded().await;
    store.login("admin@example.com", "s3cret").await;
    backend.set_fail_auth(true).await;

    let settled = store.logout().await;
    assert!(!settled.is_authenticated);
    assert!(settled.user.is_none());
    assert!(settled.error.is_none());
    // The remote session survived the failed call; local state cleared anyway.
    assert!(backend.session().await.is_some());
}

// =============================================================================
// check_session
// =============================================================================

#[tokio::test]
async fn check_session_restores_remote_session() {
    let (backend, store) = seeded().await;
    backend.sign_in("admin@example.com", "s3cret").await.unwrap();

    let settled = store.check_session().await;
    assert!(settled.is_authenticated);
    assert_eq!(settled.user.unwrap().email, "admin@example.com");
}

#[tokio::test]
async fn check_session_without_remote_session_clears() {
    let (_, store) = seeded().await;
    let settled = store.check_session().await;
    assert_eq!(settled, SessionState::default());
}

#[tokio::test]
async fn check_session_for_non_admin_session_clears_without_error() {
    let (backend, store) = seeded().await;
    backend.seed_account("viewer@example.com", "s3cret").await;
    backend.sign_in("viewer@example.com", "s3cret").await.unwrap();

    let settled = store.check_session().await;
    assert!(!settled.is_authenticated);
    assert!(settled.error.is_none());
}

#[tokio::test]
async fn check_session_failure_clears_auth_and_records_error() {
    let (backend, store) = seeded().await;
    store.login("admin@example.com", "s3cret").await;
    backend.set_fail_auth(true).await;

    let settled = store.check_session().await;
    assert!(!settled.is_authenticated);
    assert!(settled.error.is_some());
}

// =============================================================================
// update_password
// =============================================================================

#[tokio::test]
async fn update_password_succeeds_and_keeps_identity() {
    let (backend, store) = seeded().await;
    store.login("admin@example.com", "s3cret").await;

    let settled = store.update_password("newpass").await;
    assert!(settled.is_authenticated);
    assert!(settled.error.is_none());

    // The new password is live remotely.
    backend.sign_out().await.unwrap();
    assert!(backend.sign_in("admin@example.com", "newpass").await.is_ok());
}

#[tokio::test]
async fn update_password_failure_keeps_identity_and_sets_error() {
    let (backend, store) = seeded().await;
    store.login("admin@example.com", "s3cret").await;
    backend.set_fail_auth(true).await;

    let settled = store.update_password("newpass").await;
    assert!(settled.is_authenticated);
    assert_eq!(settled.user.unwrap().email, "admin@example.com");
    assert!(settled.error.is_some());
}

#[tokio::test]
async fn update_password_empty_input_fails_locally() {
    let (_, store) = seeded().await;
    store.login("admin@example.com", "s3cret").await;

    let settled = store.update_password("").await;
    assert!(settled.is_authenticated);
    assert_eq!(settled.error.as_deref(), Some("Password is required"));
}

// =============================================================================
// Durable cache
// =============================================================================

#[tokio::test]
async fn cached_snapshot_survives_reload_but_is_revalidated() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(MemoryBackend::new());
    backend.seed_admin("admin@example.com", "s3cret").await;

    let store = SessionStore::new(backend.clone(), Some(SessionCache::new(dir.path())));
    store.login("admin@example.com", "s3cret").await;

    // Simulate the remote session dying between "runs".
    backend.sign_out().await.unwrap();

    // "Reload": a fresh store over the same cache directory.
    let reloaded = SessionStore::new(backend.clone(), Some(SessionCache::new(dir.path())));
    let hint = reloaded.snapshot();
    assert!(hint.is_authenticated, "cached snapshot should render as a hint");
    assert!(!hint.is_loading);

    // Re-validation is the authority: the hint does not survive it.
    let settled = reloaded.check_session().await;
    assert!(!settled.is_authenticated);
    assert!(settled.user.is_none());
}

#[tokio::test]
async fn logout_persists_cleared_state() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(MemoryBackend::new());
    backend.seed_admin("admin@example.com", "s3cret").await;

    let store = SessionStore::new(backend.clone(), Some(SessionCache::new(dir.path())));
    store.login("admin@example.com", "s3cret").await;
    store.logout().await;

    let reloaded = SessionStore::new(backend, Some(SessionCache::new(dir.path())));
    assert_eq!(reloaded.snapshot(), SessionState::default());
}
