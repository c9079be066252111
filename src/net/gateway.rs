//! Authenticated request gateway.
//!
//! ARCHITECTURE
//! ============
//! Every API binding funnels through [`Gateway::send`]. It attaches the bearer
//! token from the session store, decodes the envelope, and owns the only
//! session-affecting error policy in the client:
//!
//! - 401 with an auth code: join the single-flight refresh, then retry the
//!   original request exactly once.
//! - Auth error that could not be recovered, or 403 with a ban code: clear the
//!   session, unless it was replaced (new login, logout) while the request was
//!   in flight. The failure only speaks for the token it was sent with.
//!
//! `skip_auth` requests (login, register, refresh, logout, public reads) get
//! no bearer header and never refresh or clear.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::envelope;
use super::error::ApiError;
use super::refresh::RefreshCoordinator;
use super::transport::{HttpRequest, Transport};
use crate::config::AuthErrorPolicy;
use crate::session::SessionStore;

/// Description of one logical API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub skip_auth: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, skip_auth: false }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Send without a bearer token and opt out of refresh/clear handling.
    #[must_use]
    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }
}

/// Decoded `data` payload plus the HTTP status that carried it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    store: Arc<SessionStore>,
    refresher: RefreshCoordinator,
    policy: AuthErrorPolicy,
}

impl Gateway {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<SessionStore>,
        refresher: RefreshCoordinator,
        policy: AuthErrorPolicy,
    ) -> Self {
        Self { transport, store, refresher, policy }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresher
    }

    /// Send `request` and decode its `data` payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns the server's structured error, `INVALID_RESPONSE` when the
    /// payload does not match `T`, or `UNKNOWN_ERROR` on transport failure.
    pub async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        serde_json::from_value(response.data).map_err(|e| {
            tracing::warn!(path = %request.path, error = %e, "response payload did not match schema");
            ApiError::invalid_response(response.status)
        })
    }

    /// Send `request` with bearer auth and the refresh-and-retry protocol.
    ///
    /// A 204 yields an empty object without reading the body.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send_json`].
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut retried = false;
        loop {
            let (generation, token) = self.store.token_with_generation();
            let bearer = if request.skip_auth { None } else { token };
            let response = self
                .transport
                .send(HttpRequest {
                    method: request.method.clone(),
                    path: request.path.clone(),
                    body: request.body.clone(),
                    bearer,
                })
                .await?;

            if response.status == 204 {
                return Ok(ApiResponse { status: 204, data: Value::Object(Map::new()) });
            }
            if response.is_success() {
                let data = envelope::data_from_body(response.status, &response.body)?;
                return Ok(ApiResponse { status: response.status, data });
            }

            let error = envelope::error_from_body(response.status, &response.body);
            if request.skip_auth {
                return Err(error);
            }

            let auth_error = self.policy.is_auth_error(error.status, &error.code);
            if auth_error && !retried && request.path != self.refresher.path() {
                tracing::debug!(path = %request.path, code = %error.code, "access token rejected; refreshing");
                if self.refresher.refresh().await {
                    retried = true;
                    continue;
                }
            }

            if auth_error || self.policy.is_ban_error(error.status, &error.code) {
                if self.store.clear_if(generation) {
                    tracing::warn!(path = %request.path, status = error.status, code = %error.code, "session cleared");
                } else {
                    tracing::debug!(path = %request.path, code = %error.code, "session replaced during request; not clearing");
                }
            }
            return Err(error);
        }
    }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
