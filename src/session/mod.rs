//! Persisted session store for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gateway reads the access token from here on every request, the refresh
//! coordinator and auth bindings write into it, and route guards and front
//! ends read snapshots of it. Nothing else keeps a copy of the session.
//!
//! DESIGN
//! ======
//! `Session` is an enum, so a token without a user (or the reverse) cannot be
//! represented. Writes replace the whole value under a write lock and persist
//! before the lock is released. Listeners run after release so they can read
//! the store, but under a notify lock taken before the write, so observers see
//! writes in the order they were applied. Listeners must not write to the store.
//!
//! Every write bumps a generation counter. Work that started under an older
//! session (a background refresh, a request that is about to fail) writes with
//! [`SessionStore::set_auth_if`] / [`SessionStore::clear_if`] and is dropped
//! when a newer login or logout got there first.

pub mod storage;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, Weak};

use serde::{Deserialize, Serialize};

use self::storage::{MemoryStorage, RecordStorage};

/// Account role as reported by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Profile of an authenticated account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub is_banned: bool,
    pub created_at: String,
}

impl UserProfile {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Current authentication state: both halves present, or neither.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { access_token: String, user: UserProfile },
}

impl Session {
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { access_token, .. } => Some(access_token),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user, .. } => Some(user),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Decode a persisted record. Anything malformed or half-present is anonymous.
    #[must_use]
    pub fn from_record(raw: &str) -> Self {
        let Ok(record) = serde_json::from_str::<StoredSession>(raw) else {
            return Self::Anonymous;
        };
        match (record.access_token, record.user) {
            (Some(access_token), Some(user)) if !access_token.is_empty() => {
                Self::Authenticated { access_token, user }
            }
            _ => Self::Anonymous,
        }
    }

    /// Encode for persistence; `None` for the anonymous session.
    fn to_record(&self) -> Option<Result<String, serde_json::Error>> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { access_token, user } => Some(serde_json::to_string(&StoredSessionRef {
                access_token,
                user,
            })),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredSessionRef<'a> {
    access_token: &'a str,
    user: &'a UserProfile,
}

fn authenticated(access_token: String, user: UserProfile) -> Session {
    if access_token.is_empty() {
        tracing::warn!(user_id = user.id, "refusing session with empty access token");
        return Session::Anonymous;
    }
    Session::Authenticated { access_token, user }
}

// =============================================================================
// LISTENERS
// =============================================================================

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener)>>,
}

impl Listeners {
    fn snapshot(&self) -> Vec<Listener> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect()
    }
}

/// Handle returned by [`SessionStore::subscribe`].
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    /// Remove the listener. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        listeners
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(id, _)| *id != self.id);
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Single source of truth for the session, persisted to a [`RecordStorage`].
pub struct SessionStore {
    state: RwLock<Versioned>,
    notify: Mutex<()>,
    listeners: Arc<Listeners>,
    storage: Box<dyn RecordStorage>,
}

struct Versioned {
    generation: u64,
    session: Session,
}

impl SessionStore {
    /// Hydrate from `storage`. Unreadable or invalid records yield an anonymous session.
    #[must_use]
    pub fn load(storage: Box<dyn RecordStorage>) -> Self {
        let initial = match storage.load() {
            Ok(Some(raw)) => Session::from_record(&raw),
            Ok(None) => Session::Anonymous,
            Err(e) => {
                tracing::warn!(error = %e, "session record unreadable; starting anonymous");
                Session::Anonymous
            }
        };
        tracing::debug!(authenticated = initial.is_authenticated(), "session store loaded");
        Self {
            state: RwLock::new(Versioned { generation: 0, session: initial }),
            notify: Mutex::new(()),
            listeners: Arc::default(),
            storage,
        }
    }

    /// Non-persistent store starting anonymous.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStorage::new()))
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn state(&self) -> Session {
        self.read().session.clone()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read().session.access_token().map(ToOwned::to_owned)
    }

    /// Counter bumped by every write. Pair with the `_if` writers.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Access token and the generation it belongs to, read together.
    #[must_use]
    pub fn token_with_generation(&self) -> (u64, Option<String>) {
        let state = self.read();
        (state.generation, state.session.access_token().map(ToOwned::to_owned))
    }

    /// Replace the session with an authenticated one and notify listeners.
    /// An empty token cannot survive a reload, so it clears instead.
    pub fn set_auth(&self, access_token: String, user: UserProfile) {
        self.write(None, authenticated(access_token, user));
    }

    /// Like [`SessionStore::set_auth`], but only if no write happened since
    /// `generation` was read. Returns whether the write was applied.
    pub fn set_auth_if(&self, generation: u64, access_token: String, user: UserProfile) -> bool {
        self.write(Some(generation), authenticated(access_token, user))
    }

    /// Reset to anonymous, drop the persisted record, and notify listeners.
    pub fn clear(&self) {
        self.write(None, Session::Anonymous);
    }

    /// Like [`SessionStore::clear`], but only if no write happened since
    /// `generation` was read. Returns whether the write was applied.
    pub fn clear_if(&self, generation: u64) -> bool {
        self.write(Some(generation), Session::Anonymous)
    }

    /// Register a change listener. Listeners run synchronously on every write
    /// and must not write to the store themselves.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        Subscription { id, listeners: Arc::downgrade(&self.listeners) }
    }

    fn read(&self) -> RwLockReadGuard<'_, Versioned> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, expected: Option<u64>, next: Session) -> bool {
        let _ordered = self.notify.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if expected.is_some_and(|generation| generation != state.generation) {
                tracing::debug!(
                    expected = ?expected,
                    current = state.generation,
                    "dropping session write superseded by a newer one"
                );
                return false;
            }
            match next.user() {
                Some(user) => tracing::info!(user_id = user.id, username = %user.username, "session established"),
                None => tracing::info!("session cleared"),
            }
            state.generation += 1;
            state.session = next;
            self.persist(&state.session);
            state.session.clone()
        };
        for listener in self.listeners.snapshot() {
            listener(&snapshot);
        }
        true
    }

    fn persist(&self, session: &Session) {
        let result = match session.to_record() {
            None => self.storage.remove(),
            Some(Ok(raw)) => self.storage.save(&raw),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "session record encode failed");
                return;
            }
        };
        // The in-memory session stays authoritative even if the disk write fails.
        if let Err(e) = result {
            tracing::warn!(error = %e, "session record write failed");
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
