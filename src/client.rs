//! `BlogClient`: one per process, wiring storage, transport, gateway and boot.
//!
//! SYSTEM CONTEXT
//! ==============
//! Front ends construct a single client, call [`BlogClient::start`] once, then
//! pass [`BlogClient::gateway`] to the `api` bindings. Everything shares the
//! same `Arc<SessionStore>` and refresh slot.

use std::sync::Arc;

use crate::api;
use crate::api::types::{AuthPayload, LogoutAck};
use crate::boot::{BootReport, BootSequencer};
use crate::config::{AuthErrorPolicy, BootPolicy, ClientConfig, ConfigError};
use crate::guard::{self, GuardDecision};
use crate::net::cookies::{COOKIE_RECORD_KEY, PersistentCookieJar};
use crate::net::error::ApiError;
use crate::net::gateway::Gateway;
use crate::net::refresh::RefreshCoordinator;
use crate::net::transport::{ReqwestTransport, Transport, TransportError};
use crate::session::storage::{FileStorage, RecordStorage};
use crate::session::{Session, SessionStore, Subscription};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),
}

impl ClientError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.code(),
            Self::Transport(e) => e.code(),
        }
    }
}

pub struct BlogClient {
    store: Arc<SessionStore>,
    gateway: Gateway,
    boot: BootSequencer,
}

impl BlogClient {
    /// Build from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment is invalid or the HTTP client fails to build.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_config(&ClientConfig::from_env()?)
    }

    /// Build a client persisting its session and cookies under `config.session_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let jar = Arc::new(PersistentCookieJar::load(Box::new(FileStorage::with_key(
            &config.session_dir,
            COOKIE_RECORD_KEY,
        ))));
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config.base_url, config.timeouts, jar)?);
        tracing::debug!(
            base_url = %config.base_url,
            session_dir = %config.session_dir.display(),
            boot_policy = ?config.boot_policy,
            "client configured"
        );
        Ok(Self::from_parts(
            config.boot_policy,
            config.auth_errors.clone(),
            transport,
            Box::new(FileStorage::new(&config.session_dir)),
        ))
    }

    /// Assemble a client from explicit parts. Tests use this with an
    /// in-process transport and memory storage.
    #[must_use]
    pub fn from_parts(
        boot_policy: BootPolicy,
        auth_errors: AuthErrorPolicy,
        transport: Arc<dyn Transport>,
        storage: Box<dyn RecordStorage>,
    ) -> Self {
        let store = Arc::new(SessionStore::load(storage));
        let refresher = RefreshCoordinator::new(Arc::clone(&transport), Arc::clone(&store));
        let boot = BootSequencer::new(boot_policy, Arc::clone(&store), refresher.clone());
        let gateway = Gateway::new(transport, Arc::clone(&store), refresher, auth_errors);
        Self { store, gateway, boot }
    }

    /// Run the boot sequence. Call once before rendering or issuing commands.
    pub async fn start(&self) -> BootReport {
        self.boot.run().await
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    #[must_use]
    pub fn boot(&self) -> &BootSequencer {
        &self.boot
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.store.state()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    /// Apply the route guard for `path` to the current session.
    #[must_use]
    pub fn guard(&self, path: &str) -> GuardDecision {
        guard::guard_route(&self.store.state(), path)
    }

    /// # Errors
    ///
    /// Returns the server's error for bad credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthPayload, ApiError> {
        api::auth::login(&self.gateway, username, password).await
    }

    /// # Errors
    ///
    /// Returns the server's error; the local session is cleared regardless.
    pub async fn logout(&self) -> Result<LogoutAck, ApiError> {
        api::auth::logout(&self.gateway).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
