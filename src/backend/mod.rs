//! Hosted-backend seams for auth and persistence.
//!
//! DESIGN
//! ======
//! The stores depend on `Arc<dyn AuthBackend>` / `Arc<dyn PropertyBackend>`
//! rather than a concrete client, so the HTTP implementation and the
//! in-memory implementation are interchangeable. The hosted service's wire
//! protocol stays behind this boundary.

pub mod http;
pub mod memory;

use uuid::Uuid;

use crate::model::{AdminUser, Property, PropertyDraft, PropertyPatch};

/// Failures surfaced by either backend seam.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("no active session")]
    NotAuthenticated,
    #[error("property not found: {0}")]
    NotFound(Uuid),
    #[error("network error: {0}")]
    Network(String),
    #[error("service error: {0}")]
    Service(String),
}

/// Remote auth service: sign-in/out, session introspection, password
/// change, and the admin allow-list lookup.
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    /// Authenticate with email/password, establishing a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminUser, BackendError>;

    /// Invalidate the current session.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Return the identity behind the current session, if any.
    async fn current_session(&self) -> Result<Option<AdminUser>, BackendError>;

    /// Change the current user's password.
    async fn update_password(&self, new_password: &str) -> Result<(), BackendError>;

    /// True when the email is present in the `admin_users` allow-list.
    async fn is_admin(&self, email: &str) -> Result<bool, BackendError>;
}

/// Remote persistence service: table-like CRUD over the `properties`
/// collection. Listing order is price descending.
#[async_trait::async_trait]
pub trait PropertyBackend: Send + Sync {
    /// Fetch the full collection, ordered by price descending.
    async fn list_properties(&self) -> Result<Vec<Property>, BackendError>;

    /// Insert a new row; the backend assigns id and timestamps and returns
    /// the stored row.
    async fn insert_property(&self, draft: &PropertyDraft) -> Result<Property, BackendError>;

    /// Apply the present fields of `patch` to one row and return the stored
    /// row (authoritative for `updated_at`).
    async fn update_property(&self, id: Uuid, patch: &PropertyPatch) -> Result<Property, BackendError>;

    /// Delete one row. `NotFound` when no row has this id.
    async fn delete_property(&self, id: Uuid) -> Result<(), BackendError>;
}
