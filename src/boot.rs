//! Startup session recovery.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs once per process before any view or command is rendered. Decides
//! whether the cached session can be shown right away or must be confirmed
//! with the server first.
//!
//! DESIGN
//! ======
//! - `Strict`: refresh, adopt on success, clear on failure, then report Ready.
//! - `Optimistic`: with a cached session, report Ready immediately and refresh
//!   in a spawned task. A failed background refresh leaves the stale session in
//!   place; the gateway clears it later if the server really rejects it.
//!   A login or logout made while that refresh is in flight waits for it and
//!   then overrides it.
//!   Without a cached session this falls back to `Strict`.
//!
//! The phase is published on a `watch` channel so observers can wait for
//! `Ready` without polling.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::BootPolicy;
use crate::net::refresh::RefreshCoordinator;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPhase {
    Booting,
    Ready,
}

/// What boot decided. `background` is set only for an optimistic boot that
/// rendered from cache; it resolves to the refresh outcome.
#[derive(Debug)]
pub struct BootReport {
    pub policy: BootPolicy,
    pub phase: BootPhase,
    pub used_cached_session: bool,
    pub background: Option<JoinHandle<bool>>,
}

pub struct BootSequencer {
    policy: BootPolicy,
    store: Arc<SessionStore>,
    refresher: RefreshCoordinator,
    phase: watch::Sender<BootPhase>,
}

impl BootSequencer {
    #[must_use]
    pub fn new(policy: BootPolicy, store: Arc<SessionStore>, refresher: RefreshCoordinator) -> Self {
        let (phase, _) = watch::channel(BootPhase::Booting);
        Self { policy, store, refresher, phase }
    }

    #[must_use]
    pub fn policy(&self) -> BootPolicy {
        self.policy
    }

    #[must_use]
    pub fn phase(&self) -> BootPhase {
        *self.phase.borrow()
    }

    /// Receiver that observes the `Booting` -> `Ready` transition.
    #[must_use]
    pub fn watch_phase(&self) -> watch::Receiver<BootPhase> {
        self.phase.subscribe()
    }

    /// Recover the session according to the configured policy.
    ///
    /// Must be called from within a Tokio runtime; the optimistic path spawns.
    pub async fn run(&self) -> BootReport {
        let cached = self.store.state().is_authenticated();
        let report = match self.policy {
            BootPolicy::Optimistic if cached => {
                info!("boot: rendering from cached session, refreshing in background");
                // Claim the refresh slot before returning, so a login or logout
                // issued right after boot waits for it and wins over its result.
                let pending = self.refresher.begin();
                let background = tokio::spawn(async move {
                    let refreshed = pending.await;
                    if !refreshed {
                        warn!("background session refresh failed; keeping cached session");
                    }
                    refreshed
                });
                BootReport {
                    policy: self.policy,
                    phase: BootPhase::Ready,
                    used_cached_session: true,
                    background: Some(background),
                }
            }
            _ => {
                debug!(policy = ?self.policy, cached, "boot: confirming session with server");
                if self.refresher.refresh().await {
                    info!("boot: session refreshed");
                } else {
                    info!("boot: no valid session; continuing anonymous");
                    self.store.clear();
                }
                BootReport { policy: self.policy, phase: BootPhase::Ready, used_cached_session: false, background: None }
            }
        };
        self.phase.send_replace(BootPhase::Ready);
        report
    }
}

#[cfg(test)]
#[path = "boot_test.rs"]
mod tests;
