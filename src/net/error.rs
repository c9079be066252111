//! Structured error surfaced by every API call.

use serde_json::Value;

use super::transport::TransportError;

/// Fallback code when the server's error body is missing or unreadable.
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
/// A 2xx response that does not carry the expected payload.
pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";

/// Error returned by the gateway: either the server said no, the server said
/// something unparseable, or the request never completed (`status == 0`).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} ({code}, HTTP {status})")]
pub struct ApiError {
    pub status: u16,
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
    pub request_id: Option<String>,
}

impl ApiError {
    #[must_use]
    pub fn new(status: u16, code: &str, message: &str) -> Self {
        Self { status, code: code.to_owned(), message: message.to_owned(), details: None, request_id: None }
    }

    /// Protocol violation: 2xx without a usable `data` payload.
    #[must_use]
    pub fn invalid_response(status: u16) -> Self {
        Self::new(status, INVALID_RESPONSE, "Server response format is invalid")
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// `true` when the request never produced an HTTP response.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.status == 0
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        Self::new(0, UNKNOWN_ERROR, &error.to_string())
    }
}
