//! In-memory backend for tests and local demos.
//!
//! DESIGN
//! ======
//! Implements both backend seams against plain in-memory tables: seeded
//! accounts, an admin allow-list, one session slot, and a `properties`
//! vector. Failure switches simulate network outages per seam, and a list
//! latency knob makes response-ordering races reproducible.

use std::collections::HashSet;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AuthBackend, BackendError, PropertyBackend};
use crate::model::{AdminUser, Property, PropertyDraft, PropertyPatch};

#[derive(Debug, Clone)]
struct Account {
    user: AdminUser,
    password: String,
}

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    admins: HashSet<String>,
    session: Option<AdminUser>,
    properties: Vec<Property>,
    fail_auth: bool,
    fail_properties: bool,
    list_delay: Option<Duration>,
}

#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn outage() -> BackendError {
    BackendError::Network("simulated outage".to_owned())
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an allow-listed admin account. Returns the assigned user id.
    pub async fn seed_admin(&self, email: &str, password: &str) -> Uuid {
        let id = self.seed_account(email, password).await;
        self.inner.lock().await.admins.insert(normalize_email(email));
        id
    }

    /// Seed an account that is *not* on the admin allow-list.
    pub async fn seed_account(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        let account = Account {
            user: AdminUser { id, email: normalize_email(email) },
            password: password.to_owned(),
        };
        self.inner.lock().await.accounts.push(account);
        id
    }

    /// Seed a property row verbatim.
    pub async fn seed_property(&self, row: Property) {
        self.inner.lock().await.properties.push(row);
    }

    /// Make every auth operation fail with a network error.
    pub async fn set_fail_auth(&self, fail: bool) {
        self.inner.lock().await.fail_auth = fail;
    }

    /// Make every property operation fail with a network error.
    pub async fn set_fail_properties(&self, fail: bool) {
        self.inner.lock().await.fail_properties = fail;
    }

    /// Delay `list_properties` responses by `delay`.
    pub async fn set_list_delay(&self, delay: Duration) {
        self.inner.lock().await.list_delay = Some(delay);
    }

    /// The identity behind the current remote session, if any. Lets tests
    /// observe remote-side invalidation.
    pub async fn session(&self) -> Option<AdminUser> {
        self.inner.lock().await.session.clone()
    }

    /// Number of stored property rows.
    pub async fn property_count(&self) -> usize {
        self.inner.lock().await.properties.len()
    }
}

// =============================================================================
// AUTH
// =============================================================================

#[async_trait::async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminUser, BackendError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_auth {
            return Err(outage());
        }
        let normalized = normalize_email(email);
        let user = inner
            .accounts
            .iter()
            .find(|a| a.user.email == normalized && a.password == password)
            .map(|a| a.user.clone())
            .ok_or(BackendError::InvalidCredentials)?;
        inner.session = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_auth {
            return Err(outage());
        }
        inner.session = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AdminUser>, BackendError> {
        let inner = self.inner.lock().await;
        if inner.fail_auth {
            return Err(outage());
        }
        Ok(inner.session.clone())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_auth {
            return Err(outage());
        }
        let Some(user) = inner.session.clone() else {
            return Err(BackendError::NotAuthenticated);
        };
        let account = inner
            .accounts
            .iter_mut()
            .find(|a| a.user.id == user.id)
            .ok_or(BackendError::NotAuthenticated)?;
        account.password = new_password.to_owned();
        Ok(())
    }

    async fn is_admin(&self, email: &str) -> Result<bool, BackendError> {
        let inner = self.inner.lock().await;
        if inner.fail_auth {
            return Err(outage());
        }
        Ok(inner.admins.contains(&normalize_email(email)))
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

#[async_trait::async_trait]
impl PropertyBackend for MemoryBackend {
    async fn list_properties(&self) -> Result<Vec<Property>, BackendError> {
        let delay = self.inner.lock().await.list_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let inner = self.inner.lock().await;
        if inner.fail_properties {
            return Err(outage());
        }
        let mut rows = inner.properties.clone();
        rows.sort_by(|a, b| b.price.cmp(&a.price));
        Ok(rows)
    }

    async fn insert_property(&self, draft: &PropertyDraft) -> Result<Property, BackendError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_properties {
            return Err(outage());
        }
        let now = OffsetDateTime::now_utc();
        let row = Property {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            price: draft.price,
            location: draft.location.clone(),
            size: draft.size.clone(),
            kind: draft.kind,
            featured: draft.featured,
            image: draft.image.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.properties.push(row.clone());
        Ok(row)
    }

    async fn update_property(&self, id: Uuid, patch: &PropertyPatch) -> Result<Property, BackendError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_properties {
            return Err(outage());
        }
        let row = inner
            .properties
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(BackendError::NotFound(id))?;
        patch.apply(row);
        row.updated_at = OffsetDateTime::now_utc();
        Ok(row.clone())
    }

    async fn delete_property(&self, id: Uuid) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_properties {
            return Err(outage());
        }
        let before = inner.properties.len();
        inner.properties.retain(|p| p.id != id);
        if inner.properties.len() == before {
            return Err(BackendError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
