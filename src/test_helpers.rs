//! Shared fixtures for unit tests: a scripted backend and envelope builders.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

use crate::config::AuthErrorPolicy;
use crate::net::gateway::Gateway;
use crate::net::refresh::{REFRESH_PATH, RefreshCoordinator};
use crate::net::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::session::{Role, SessionStore, UserProfile};

type Handler = dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync;

/// In-process backend answering through a closure and recording every request.
pub struct MockBackend {
    handler: Box<Handler>,
    refresh_delay: Duration,
    calls: Mutex<Vec<HttpRequest>>,
}

impl MockBackend {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self { handler: Box::new(handler), refresh_delay: Duration::ZERO, calls: Mutex::new(Vec::new()) })
    }

    /// Like [`MockBackend::new`], but refresh calls stall for `delay` first.
    pub fn with_refresh_delay<F>(delay: Duration, handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self { handler: Box::new(handler), refresh_delay: delay, calls: Mutex::new(Vec::new()) })
    }

    pub fn count(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|r| r.path == path).count()
    }

    pub fn refresh_count(&self) -> usize {
        self.count(REFRESH_PATH)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for MockBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(request.clone());
        if request.path == REFRESH_PATH && !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        (self.handler)(&request)
    }
}

pub fn make_user(role: Role) -> UserProfile {
    UserProfile {
        id: 42,
        username: "grace".to_owned(),
        role,
        is_banned: false,
        created_at: "2024-05-01T08:30:00Z".to_owned(),
    }
}

pub fn auth_data(token: &str, role: Role) -> Value {
    json!({ "accessToken": token, "user": make_user(role) })
}

/// 2xx response wrapped in the success envelope.
pub fn ok(data: Value) -> Result<HttpResponse, TransportError> {
    let body = json!({ "code": "OK", "message": "ok", "data": data, "requestId": "req-test" });
    Ok(HttpResponse { status: 200, body: body.to_string().into_bytes() })
}

/// Error response wrapped in the error envelope.
pub fn fail(status: u16, code: &str) -> Result<HttpResponse, TransportError> {
    let body = json!({ "code": code, "message": format!("{code} message"), "requestId": "req-err" });
    Ok(HttpResponse { status, body: body.to_string().into_bytes() })
}

pub fn authed_store(token: &str, role: Role) -> Arc<SessionStore> {
    let store = SessionStore::in_memory();
    store.set_auth(token.to_owned(), make_user(role));
    Arc::new(store)
}

pub fn gateway_for(backend: &Arc<MockBackend>, store: &Arc<SessionStore>) -> Gateway {
    let transport: Arc<dyn Transport> = backend.clone();
    let refresher = RefreshCoordinator::new(Arc::clone(&transport), Arc::clone(store));
    Gateway::new(transport, Arc::clone(store), refresher, AuthErrorPolicy::default())
}
