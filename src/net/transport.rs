//! Raw HTTP transport.
//!
//! DESIGN
//! ======
//! The gateway never touches reqwest directly; it speaks `HttpRequest` /
//! `HttpResponse` through the [`Transport`] trait so tests can script the
//! backend without sockets. The reqwest implementation always sends the
//! cookie jar, since the refresh credential travels as a cookie.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use super::cookies::PersistentCookieJar;
use crate::config::Timeouts;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl TransportError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Request(_) => "TRANSPORT_REQUEST",
            Self::Timeout => "TRANSPORT_TIMEOUT",
            Self::ClientBuild(_) => "TRANSPORT_CLIENT_BUILD",
        }
    }

    fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() { Self::Timeout } else { Self::Request(error.to_string()) }
    }
}

/// One outbound request, path relative to the backend base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async HTTP seam. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the raw response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no HTTP response was obtained.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build a transport rooted at `base_url` using `jar` for cookies.
    ///
    /// # Errors
    ///
    /// Returns an error if the reqwest client fails to build.
    pub fn new(base_url: &str, timeouts: Timeouts, jar: Arc<PersistentCookieJar>) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .cookie_provider(jar)
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(method = %request.method, path = %request.path, "http request");

        let mut builder = self
            .http
            .request(request.method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;
        tracing::debug!(status, path = %request.path, "http response");
        Ok(HttpResponse { status, body: body.to_vec() })
    }
}
