//! Property store — cache of the listing collection and mediator for all
//! mutations.
//!
//! DESIGN
//! ======
//! The cache reflects only backend-confirmed state: no optimistic updates.
//! A fetch replaces the whole collection; create/update/delete patch it
//! incrementally from the row the backend returns, so a mutation costs one
//! round trip before the UI reflects it. The cache invariant is "sorted by
//! price descending", re-established after every mutation.
//!
//! Each fetch takes a generation; a fetch that settles after a newer fetch
//! has started discards its response instead of clobbering the cache.
//! Writes carry no such guard: concurrent updates to one id are
//! last-writer-wins, and callers are expected to gate controls on
//! `is_loading`.
//!
//! ERROR HANDLING
//! ==============
//! Failures are converted into the `error` field of the settled snapshot.
//! Failed reads keep serving the previous cache (stale-but-available);
//! failed writes apply nothing.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::{BackendError, PropertyBackend};
use crate::model::{Property, PropertyDraft, PropertyPatch};

// =============================================================================
// STATE
// =============================================================================

/// Observable cache state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyState {
    pub properties: Vec<Property>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct Inner {
    state: PropertyState,
    fetch_generation: u64,
}

// =============================================================================
// STORE
// =============================================================================

pub struct PropertyStore {
    backend: Arc<dyn PropertyBackend>,
    inner: RwLock<Inner>,
}

fn sort_by_price_desc(rows: &mut [Property]) {
    rows.sort_by(|a, b| b.price.cmp(&a.price));
}

impl PropertyStore {
    #[must_use]
    pub fn new(backend: Arc<dyn PropertyBackend>) -> Self {
        Self { backend, inner: RwLock::new(Inner::default()) }
    }

    /// Current cache state. Cheap clone.
    #[must_use]
    pub fn snapshot(&self) -> PropertyState {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).state.clone()
    }

    /// Pure in-memory lookup; absence is `None`, never a network call.
    /// Callers needing a guaranteed-current row must fetch first.
    #[must_use]
    pub fn get_property_by_id(&self, id: Uuid) -> Option<Property> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .properties
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Replace the whole cache with the backend's collection. On failure
    /// the previous cache stays served and `error` is set.
    pub async fn fetch_properties(&self) -> PropertyState {
        let generation = {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            inner.fetch_generation += 1;
            inner.state.is_loading = true;
            inner.state.error = None;
            inner.fetch_generation
        };

        let result = self.backend.list_properties().await;

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.fetch_generation != generation {
            // A newer fetch owns the cache now; drop this response.
            info!(generation, "discarding stale fetch response");
            return inner.state.clone();
        }
        match result {
            Ok(mut rows) => {
                sort_by_price_desc(&mut rows);
                inner.state.properties = rows;
                inner.state.is_loading = false;
                info!(count = inner.state.properties.len(), "property cache refreshed");
            }
            Err(e) => {
                warn!(error = %e, "property fetch failed; keeping cached collection");
                inner.state.error = Some(e.to_string());
                inner.state.is_loading = false;
            }
        }
        inner.state.clone()
    }

    /// Insert via the backend and merge the returned row (backend-assigned
    /// id and timestamps) into the cache.
    pub async fn create_property(&self, draft: PropertyDraft) -> PropertyState {
        self.begin();
        match self.backend.insert_property(&draft).await {
            Ok(row) => {
                info!(property_id = %row.id, "property created");
                self.settle_with(|state| {
                    state.properties.push(row);
                    sort_by_price_desc(&mut state.properties);
                })
            }
            Err(e) => self.settle_error(e),
        }
    }

    /// Sparse update: only the present fields of `patch` are sent. An empty
    /// patch settles locally without a network call. On success the
    /// backend's returned row replaces the cache entry (authoritative for
    /// `updated_at`). Concurrent updates to one id are last-writer-wins.
    pub async fn update_property(&self, id: Uuid, patch: PropertyPatch) -> PropertyState {
        if patch.is_empty() {
            return self.snapshot();
        }
        self.begin();
        match self.backend.update_property(id, &patch).await {
            Ok(row) => self.settle_with(|state| {
                if let Some(pos) = state.properties.iter().position(|p| p.id == id) {
                    state.properties[pos] = row;
                } else {
                    // Row exists remotely but was missing locally (e.g. created
                    // elsewhere since the last fetch); adopt it.
                    state.properties.push(row);
                }
                sort_by_price_desc(&mut state.properties);
            }),
            Err(e) => self.settle_error(e),
        }
    }

    /// Delete remotely, then drop the cache entry only after confirmed
    /// success. A backend `NotFound` counts as success: the row is gone
    /// either way, so repeated deletes are no-ops for the cache.
    pub async fn delete_property(&self, id: Uuid) -> PropertyState {
        self.begin();
        match self.backend.delete_property(id).await {
            Ok(()) | Err(BackendError::NotFound(_)) => {
                info!(property_id = %id, "property deleted");
                self.settle_with(|state| state.properties.retain(|p| p.id != id))
            }
            Err(e) => self.settle_error(e),
        }
    }

    // -------------------------------------------------------------------------
    // State transitions. Locks are never held across an await.
    // -------------------------------------------------------------------------

    fn begin(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.state.is_loading = true;
        inner.state.error = None;
    }

    fn settle_with(&self, apply: impl FnOnce(&mut PropertyState)) -> PropertyState {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.state.is_loading = false;
        apply(&mut inner.state);
        inner.state.clone()
    }

    fn settle_error(&self, e: BackendError) -> PropertyState {
        warn!(error = %e, "property mutation failed; cache unchanged");
        self.settle_with(|state| state.error = Some(e.to_string()))
    }
}

#[cfg(test)]
#[path = "property_test.rs"]
mod tests;
