//! Backend response envelope.
//!
//! Success: `{"code":"OK","message":..,"data":..,"requestId":..}`.
//! Error:   `{"code":..,"message":..,"details"?:..,"requestId"?:..}`.

use serde::Deserialize;
use serde_json::Value;

use super::error::{ApiError, UNKNOWN_ERROR};

const GENERIC_ERROR_MESSAGE: &str = "Request failed";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<Value>,
    #[serde(default)]
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuccessBody {
    #[serde(default)]
    data: Option<Value>,
}

/// Build the structured error for a non-2xx response.
///
/// An unreadable body degrades to `UNKNOWN_ERROR` / "Request failed".
#[must_use]
pub fn error_from_body(status: u16, body: &[u8]) -> ApiError {
    let parsed = serde_json::from_slice::<ErrorBody>(body).unwrap_or_default();
    ApiError {
        status,
        code: parsed
            .code
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_owned()),
        message: parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_owned()),
        details: parsed.details,
        request_id: parsed.request_id,
    }
}

/// Extract `data` from a 2xx body.
///
/// # Errors
///
/// Returns `INVALID_RESPONSE` when the body is not JSON or `data` is absent/null.
pub fn data_from_body(status: u16, body: &[u8]) -> Result<Value, ApiError> {
    match serde_json::from_slice::<SuccessBody>(body) {
        Ok(SuccessBody { data: Some(data) }) if !data.is_null() => Ok(data),
        _ => Err(ApiError::invalid_response(status)),
    }
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
