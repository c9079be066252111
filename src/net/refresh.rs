//! Single-flight access-token refresh.
//!
//! DESIGN
//! ======
//! A process-wide slot holds the in-flight refresh as a shared future. The slot
//! is checked and filled under a synchronous lock before the first await, so
//! concurrent callers that all saw a 401 attach to the same network call
//! instead of racing to rotate the refresh cookie. A drop guard inside the
//! shared future empties the slot on every exit path, letting a later 401
//! start a fresh attempt.
//!
//! The store generation is captured when the slot is claimed. If a login or
//! logout lands while the call is in flight, the refreshed session is dropped
//! instead of resurrecting or replacing what the user just did.
//!
//! A failed refresh never clears the session here; the gateway decides that.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Method;

use super::envelope;
use super::transport::{HttpRequest, Transport};
use crate::api::types::AuthPayload;
use crate::session::SessionStore;

/// Endpoint that mints a new access token from the refresh cookie.
pub const REFRESH_PATH: &str = "/api/auth/refresh";

pub(crate) type PendingRefresh = Shared<BoxFuture<'static, bool>>;

/// Cloneable handle to the shared refresh slot.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<RefreshInner>,
}

struct RefreshInner {
    transport: Arc<dyn Transport>,
    store: Arc<SessionStore>,
    pending: Mutex<Option<(u64, PendingRefresh)>>,
    next_id: AtomicU64,
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, store: Arc<SessionStore>) -> Self {
        Self {
            inner: Arc::new(RefreshInner {
                transport,
                store,
                pending: Mutex::new(None),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &'static str {
        REFRESH_PATH
    }

    /// `true` while a refresh call is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Wait for the in-flight refresh, if any, without starting a new one.
    ///
    /// Session mutations call this first so their server call is ordered
    /// after the refresh and its cookie rotation.
    pub async fn settle(&self) {
        let pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(_, pending)| pending.clone());
        if let Some(pending) = pending {
            tracing::debug!("waiting for in-flight session refresh");
            pending.await;
        }
    }

    /// Refresh the access token, joining an in-flight attempt if there is one.
    ///
    /// Returns `true` once a new session has been written to the store, and
    /// `false` when the refresh failed or was superseded by another write.
    pub async fn refresh(&self) -> bool {
        self.begin().await
    }

    /// Claim the slot (or join its occupant) without awaiting. The store
    /// generation is pinned here, so a caller that spawns the returned future
    /// is already ordered before any later session write.
    pub(crate) fn begin(&self) -> PendingRefresh {
        let mut slot = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, pending)) = slot.as_ref() {
            tracing::debug!("joining in-flight session refresh");
            return pending.clone();
        }
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let generation = self.inner.store.generation();
        let pending = run_refresh(Arc::clone(&self.inner), id, generation).boxed().shared();
        *slot = Some((id, pending.clone()));
        pending
    }
}

/// Empties the slot when the refresh future finishes or is dropped.
struct SlotRelease {
    inner: Arc<RefreshInner>,
    id: u64,
}

impl Drop for SlotRelease {
    fn drop(&mut self) {
        let mut slot = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|(id, _)| *id == self.id) {
            *slot = None;
        }
    }
}

async fn run_refresh(inner: Arc<RefreshInner>, id: u64, generation: u64) -> bool {
    let _release = SlotRelease { inner: Arc::clone(&inner), id };
    tracing::debug!(attempt = id, generation, "session refresh started");

    let request = HttpRequest { method: Method::POST, path: REFRESH_PATH.to_owned(), body: None, bearer: None };
    let response = match inner.transport.send(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "session refresh failed");
            return false;
        }
    };
    if !response.is_success() {
        tracing::warn!(status = response.status, "session refresh rejected");
        return false;
    }

    let Some(payload) = envelope::data_from_body(response.status, &response.body)
        .ok()
        .and_then(|data| serde_json::from_value::<AuthPayload>(data).ok())
        .filter(|payload| !payload.access_token.is_empty())
    else {
        tracing::warn!(status = response.status, "session refresh returned malformed payload");
        return false;
    };

    let applied = inner.store.set_auth_if(generation, payload.access_token, payload.user);
    if !applied {
        tracing::info!(attempt = id, "session changed during refresh; discarding refreshed token");
    }
    applied
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;
